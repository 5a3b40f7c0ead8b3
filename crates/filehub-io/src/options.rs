//! Raw form input for per-feature options, turned into
//! [`FeatureParams`] when the user submits.

use filehub_intake::{
    CompressParams, Feature, FeatureParams, PageSelection, ParamError, PasswordAction,
};

/// Text as typed into a feature card's option fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOptions {
    /// Colour count for the compressor.
    pub colors: String,
    /// Pages to remove, e.g. `1, 3, 5-7`.
    pub pages: String,
    /// `true` to remove a password, `false` to add one.
    pub unlock: bool,
    pub password: String,
    pub confirm: String,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            colors: CompressParams::DEFAULT_COLORS.to_string(),
            pages: String::new(),
            unlock: false,
            password: String::new(),
            confirm: String::new(),
        }
    }
}

impl CardOptions {
    /// Parameters for `feature`. Only the fields that feature uses are
    /// read.
    ///
    /// # Errors
    ///
    /// Returns the [`ParamError`] for an empty or malformed page list
    /// or an empty or unconfirmed password.
    pub fn params(&self, feature: Feature) -> Result<FeatureParams, ParamError> {
        Ok(match feature {
            Feature::Compress => FeatureParams::Compress(CompressParams::from_input(&self.colors)),
            Feature::RemovePages => FeatureParams::RemovePages(PageSelection::parse(&self.pages)?),
            Feature::PdfPassword => {
                let action = if self.unlock {
                    PasswordAction::Remove {
                        password: self.password.clone(),
                    }
                } else {
                    PasswordAction::Add {
                        password: self.password.clone(),
                        confirm: self.confirm.clone(),
                    }
                };
                action.validate()?;
                FeatureParams::Password(action)
            }
            Feature::Ico
            | Feature::WebpToPng
            | Feature::ImagesToPdf
            | Feature::MergePdf
            | Feature::Sticker => FeatureParams::None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn compress_colours_are_clamped() {
        let options = CardOptions {
            colors: "1000".into(),
            ..CardOptions::default()
        };
        assert_eq!(
            options.params(Feature::Compress).unwrap(),
            FeatureParams::Compress(CompressParams::new(CompressParams::MAX_COLORS).unwrap())
        );
    }

    #[test]
    fn blank_pages_refused() {
        let options = CardOptions::default();
        assert_eq!(
            options.params(Feature::RemovePages),
            Err(ParamError::NoPages)
        );
    }

    #[test]
    fn adding_password_needs_confirmation() {
        let options = CardOptions {
            password: "secret".into(),
            confirm: "secrte".into(),
            ..CardOptions::default()
        };
        assert_eq!(
            options.params(Feature::PdfPassword),
            Err(ParamError::PasswordMismatch)
        );
    }

    #[test]
    fn removing_password_ignores_confirmation() {
        let options = CardOptions {
            unlock: true,
            password: "secret".into(),
            ..CardOptions::default()
        };
        let params = options.params(Feature::PdfPassword).unwrap();
        assert_eq!(
            params,
            FeatureParams::Password(PasswordAction::Remove {
                password: "secret".into()
            })
        );
    }

    #[test]
    fn other_features_take_no_options() {
        let options = CardOptions::default();
        for feature in [Feature::Ico, Feature::MergePdf, Feature::Sticker] {
            assert_eq!(options.params(feature), Ok(FeatureParams::None));
        }
    }
}
