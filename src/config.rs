//! Machine configuration for the contention engine
//!
//! Holds the ULA variant, the frame geometry and the delay pattern, and validates them
//! before the engine is built. Presets cover the 48K, 128K and +2A/+3 models.

use crate::error::ConfigError;

/// Pattern used when no delay sequence has been configured.
pub const DEFAULT_DELAY_PATTERN: &str = "00000000";

/// Which ULA (or gate array) is arbitrating the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UlaVariant {
    /// No contention: the executor's predicted cycles are charged directly
    #[default]
    None,
    /// Ferranti ULA (48K, 128K, +2): IO contention depends on the port address
    Sinclair,
    /// Amstrad gate array (+2A, +3): no contention during IO cycles
    Amstrad,
}

impl UlaVariant {
    /// True when instructions are timed through contended memory scripts
    pub fn is_contended(&self) -> bool {
        *self != UlaVariant::None
    }
}

/// Configuration supplied once at engine setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentionConfig {
    pub variant: UlaVariant,
    /// Eight decimal digits, indexed by `column % 8` inside the contended window
    pub delay_pattern: String,
    /// T-state at which IO and memory contention begins
    pub contention_start: u32,
    pub cycles_per_line: u32,
    pub cycles_per_frame: u32,
    /// Single-digit bank numbers that are contended when paged in at 0xC000
    pub contended_banks: String,
}

impl Default for ContentionConfig {
    fn default() -> Self {
        Self::uncontended()
    }
}

impl ContentionConfig {
    /// A machine without contention (plain Z80 timing)
    pub fn uncontended() -> Self {
        Self {
            variant: UlaVariant::None,
            delay_pattern: DEFAULT_DELAY_PATTERN.to_string(),
            contention_start: 14335,
            cycles_per_line: 224,
            cycles_per_frame: 69888,
            contended_banks: String::new(),
        }
    }

    /// ZX Spectrum 16K/48K
    pub fn spectrum_48k() -> Self {
        Self {
            variant: UlaVariant::Sinclair,
            delay_pattern: "65432100".to_string(),
            contention_start: 14335,
            cycles_per_line: 224,
            cycles_per_frame: 69888,
            contended_banks: String::new(),
        }
    }

    /// ZX Spectrum 128K and +2 (values measured on a 128K +2)
    pub fn spectrum_128k() -> Self {
        Self {
            variant: UlaVariant::Sinclair,
            delay_pattern: "65432100".to_string(),
            contention_start: 14361,
            cycles_per_line: 228,
            cycles_per_frame: 70908,
            contended_banks: "1357".to_string(),
        }
    }

    /// ZX Spectrum +2A and +3
    pub fn spectrum_plus3() -> Self {
        Self {
            variant: UlaVariant::Amstrad,
            delay_pattern: "10765432".to_string(),
            contention_start: 14360,
            cycles_per_line: 228,
            cycles_per_frame: 70908,
            contended_banks: "4567".to_string(),
        }
    }

    /// Validates the delay pattern, the bank list and the frame geometry
    ///
    /// An empty delay pattern is accepted and stands for [`DEFAULT_DELAY_PATTERN`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delay_table()?;
        self.bank_list()?;
        if self.cycles_per_line == 0 {
            return Err(ConfigError::ZeroGeometry("cycles per line"));
        }
        if self.cycles_per_frame == 0 {
            return Err(ConfigError::ZeroGeometry("cycles per frame"));
        }
        Ok(())
    }

    /// Converts the delay pattern string into eight delay values
    pub fn delay_table(&self) -> Result<[u8; 8], ConfigError> {
        let pattern = if self.delay_pattern.is_empty() {
            DEFAULT_DELAY_PATTERN
        } else {
            self.delay_pattern.as_str()
        };

        if pattern.chars().count() != 8 {
            return Err(ConfigError::DelayPatternLength(pattern.to_string()));
        }

        let mut table = [0u8; 8];
        for (slot, ch) in table.iter_mut().zip(pattern.chars()) {
            *slot = ch.to_digit(10).ok_or_else(|| ConfigError::DelayPatternChar {
                ch,
                pattern: pattern.to_string(),
            })? as u8;
        }
        Ok(table)
    }

    /// Converts the contended bank string into bank numbers
    pub fn bank_list(&self) -> Result<Vec<u8>, ConfigError> {
        self.contended_banks
            .chars()
            .map(|ch| {
                ch.to_digit(10)
                    .map(|bank| bank as u8)
                    .ok_or_else(|| ConfigError::ContendedBankChar {
                        ch,
                        banks: self.contended_banks.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ContentionConfig::spectrum_48k().validate().is_ok());
        assert!(ContentionConfig::spectrum_128k().validate().is_ok());
        assert!(ContentionConfig::spectrum_plus3().validate().is_ok());
        assert!(ContentionConfig::uncontended().validate().is_ok());
    }

    #[test]
    fn test_delay_table_parses_digits() {
        let config = ContentionConfig::spectrum_plus3();
        assert_eq!(config.delay_table().unwrap(), [1, 0, 7, 6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_empty_delay_pattern_defaults_to_zero() {
        let config = ContentionConfig {
            delay_pattern: String::new(),
            ..ContentionConfig::spectrum_48k()
        };
        assert_eq!(config.delay_table().unwrap(), [0; 8]);
    }

    #[test]
    fn test_delay_pattern_wrong_length() {
        // Nine digits is one too many
        let config = ContentionConfig {
            delay_pattern: "654321200".to_string(),
            ..ContentionConfig::spectrum_48k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayPatternLength("654321200".to_string()))
        );
    }

    #[test]
    fn test_delay_pattern_bad_character() {
        let config = ContentionConfig {
            delay_pattern: "6543210A".to_string(),
            ..ContentionConfig::spectrum_48k()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DelayPatternChar { ch: 'A', .. })
        ));
    }

    #[test]
    fn test_bank_list() {
        assert_eq!(
            ContentionConfig::spectrum_128k().bank_list().unwrap(),
            vec![1, 3, 5, 7]
        );
        let config = ContentionConfig {
            contended_banks: "13x".to_string(),
            ..ContentionConfig::spectrum_128k()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ContendedBankChar { ch: 'x', .. })
        ));
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let config = ContentionConfig {
            cycles_per_line: 0,
            ..ContentionConfig::spectrum_48k()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroGeometry("cycles per line"))
        );
    }

    #[test]
    fn test_variant_is_contended() {
        assert!(!UlaVariant::None.is_contended());
        assert!(UlaVariant::Sinclair.is_contended());
        assert!(UlaVariant::Amstrad.is_contended());
    }
}
