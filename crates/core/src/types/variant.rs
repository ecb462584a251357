//! Product variant (size and color).

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Variant`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The size is empty.
    #[error("size cannot be empty")]
    EmptySize,
    /// The size is too long.
    #[error("size must be at most {max} characters")]
    SizeTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The color is empty.
    #[error("color cannot be empty")]
    EmptyColor,
    /// The color is too long.
    #[error("color must be at most {max} characters")]
    ColorTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The (size, color) pair selecting a physical SKU of a product.
///
/// Both parts are trimmed; comparison is exact after trimming, so
/// `("M", "Black")` and `(" M ", "Black")` are the same variant while
/// `("m", "black")` is a different one.
///
/// ```
/// use tee_studio_core::Variant;
///
/// let v = Variant::new(" XL ", "Navy").unwrap();
/// assert_eq!(v.size(), "XL");
/// assert!(Variant::new("", "Navy").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variant {
    size: String,
    color: String,
}

impl Variant {
    /// Maximum length of a size label (column width).
    pub const MAX_SIZE_LENGTH: usize = 10;
    /// Maximum length of a color label (column width).
    pub const MAX_COLOR_LENGTH: usize = 30;

    /// Build a validated variant.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or exceeds its column width.
    pub fn new(size: &str, color: &str) -> Result<Self, VariantError> {
        let size = size.trim();
        let color = color.trim();

        if size.is_empty() {
            return Err(VariantError::EmptySize);
        }
        if size.chars().count() > Self::MAX_SIZE_LENGTH {
            return Err(VariantError::SizeTooLong {
                max: Self::MAX_SIZE_LENGTH,
            });
        }
        if color.is_empty() {
            return Err(VariantError::EmptyColor);
        }
        if color.chars().count() > Self::MAX_COLOR_LENGTH {
            return Err(VariantError::ColorTooLong {
                max: Self::MAX_COLOR_LENGTH,
            });
        }

        Ok(Self {
            size: size.to_owned(),
            color: color.to_owned(),
        })
    }

    /// Rebuild a variant from trusted storage without validation.
    #[must_use]
    pub const fn from_parts_unchecked(size: String, color: String) -> Self {
        Self { size, color }
    }

    /// The size label, e.g. `"M"`.
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// The color label, e.g. `"Black"`.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.size, self.color)
    }
}
