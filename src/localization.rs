//! Localized user-facing messages (search advisories, expiry labels).
//!
//! Messages live in `locales/<lang>/main.ftl` and are compiled into the binary.

use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

use crate::pantry::ExpiryStatus;

/// Language used when the requested one is unknown
pub const DEFAULT_LANGUAGE: &str = "en";

const LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager holding one Fluent bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager with every bundled language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in LOCALES {
            let locale: LanguageIdentifier = code.parse()?;
            bundles.insert(code.to_string(), Self::create_bundle(&locale, source)?);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: &LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        // Output goes to JSON and terminals, not bidi-aware UIs
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid {} resource: {:?}", locale, errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate messages in {} resource: {:?}", locale, errors))?;

        Ok(bundle)
    }

    /// Pick the bundle for a language tag such as "fr" or "fr-CA", falling back to English
    fn bundle_for(&self, language: Option<&str>) -> Option<&FluentBundle<FluentResource>> {
        let primary = language
            .and_then(|tag| tag.split(['-', '_']).next())
            .map(|code| code.trim().to_lowercase());

        primary
            .and_then(|code| self.bundles.get(&code))
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&FluentArgs>, language: Option<&str>) -> String {
        let Some(bundle) = self.bundle_for(language) else {
            return format!("Missing translation: {}", key);
        };

        let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
            return format!("Missing translation: {}", key);
        };

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            log::warn!("Errors formatting message '{}': {:?}", key, errors);
        }
        value.into_owned()
    }

    /// The "no recipe contains all N ingredients" advisory
    pub fn no_full_match_advisory(&self, searched_count: usize, language: Option<&str>) -> String {
        let mut args = FluentArgs::new();
        args.set("count", FluentValue::from(searched_count));
        self.get_message("advisory-no-full-match", Some(&args), language)
    }

    /// Display label for a pantry expiry status
    pub fn expiry_label(&self, status: ExpiryStatus, language: Option<&str>) -> String {
        self.get_message(&format!("expiry-status-{status}"), None, language)
    }
}
