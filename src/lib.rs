//! # qtionary
//!
//! Turns a raw Wiktionary article page into per-language blocks of cleaned,
//! navigable HTML: sections nested and collapsed per user settings, internal
//! links turned into in-app navigation or glossary tooltips, conjugation
//! tables synthesized from headword lines, and translation lists folded into
//! a short summary.
//!
//! ## Quick Start
//!
//! ```
//! use qtionary::{Glossary, UserSettings, transform_page};
//!
//! let html = r#"<div class="mw-parser-output">
//!   <div class="mw-heading mw-heading2"><h2 id="Spanish">Spanish</h2></div>
//!   <div class="mw-heading mw-heading3"><h3 id="Verb">Verb</h3></div>
//!   <p>to <a href="/wiki/speak">speak</a></p>
//! </div>"#;
//!
//! let output = transform_page(html, &Glossary::new(), &UserSettings::default());
//! assert_eq!(output.active_tab, "Spanish");
//! assert!(output.languages[0].content.contains(r#"data-word="speak""#));
//! ```
//!
//! ## Settings
//!
//! [`UserSettings`] carries the display languages and an ordered list of
//! section rules. A rule's prefix matches any section identifier starting
//! with it, and the first matching rule wins:
//!
//! ```
//! use qtionary::{SectionSetting, UserSettings};
//!
//! let settings = UserSettings::from_json(
//!     r#"{"displayLanguages": ["Latin"], "sectionSettings": {"Etymology_2": "hide", "Etymology": "always-show"}}"#,
//! ).unwrap();
//! assert_eq!(settings.section_rules.resolve("Etymology_2"), Some(SectionSetting::Hide));
//! assert_eq!(settings.section_rules.resolve("Etymology_1"), Some(SectionSetting::AlwaysShow));
//! ```

pub mod api;
pub mod config;
pub mod dom;
pub mod error;
pub mod glossary;
pub mod pipeline;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{LanguagePolicy, SectionRule, SectionRules, SectionSetting, UserSettings};
pub use error::{Error, Result};
pub use glossary::{Glossary, parse_glossary};
pub use pipeline::{LanguageBlock, PageOutput, transform_page};
pub use util::decode_text;
