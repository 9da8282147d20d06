//! Accessibility profiles and their typed options.
//!
//! A request names a profile and carries a loose JSON option map. Resolution
//! turns both into one closed [`Profile`] variant holding typed options;
//! [`Profile::plan`] then lists the modules those options enable, in the
//! fixed order they run.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::modules::Module;
use crate::types::{AdaptError, AdaptResult};

/// Text enlargement level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScaleLevel {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl FromStr for ScaleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ScaleLevel::None),
            "mild" => Ok(ScaleLevel::Mild),
            "moderate" => Ok(ScaleLevel::Moderate),
            "severe" => Ok(ScaleLevel::Severe),
            other => Err(format!(
                "unknown scale level '{other}' (expected none, mild, moderate or severe)"
            )),
        }
    }
}

// A bare `true` is the original on/off switch and means the moderate level.
impl<'de> Deserialize<'de> for ScaleLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<FlagOrName>::deserialize(deserializer)? {
            None | Some(FlagOrName::Flag(false)) => Ok(ScaleLevel::None),
            Some(FlagOrName::Flag(true)) => Ok(ScaleLevel::Moderate),
            Some(FlagOrName::Name(name)) => name.parse().map_err(D::Error::custom),
        }
    }
}

/// Color vision deficiency to compensate for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Colorblindness {
    #[default]
    None,
    Protanopia,
    Deuteranopia,
}

impl FromStr for Colorblindness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Colorblindness::None),
            "protanopia" => Ok(Colorblindness::Protanopia),
            "deuteranopia" => Ok(Colorblindness::Deuteranopia),
            other => Err(format!(
                "unsupported colorblindness type '{other}' (expected none, protanopia or deuteranopia)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Colorblindness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<FlagOrName>::deserialize(deserializer)? {
            None | Some(FlagOrName::Flag(false)) => Ok(Colorblindness::None),
            Some(FlagOrName::Flag(true)) => Err(D::Error::custom(
                "colorblindness type must name a deficiency, not `true`",
            )),
            Some(FlagOrName::Name(name)) => name.parse().map_err(D::Error::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrName {
    Flag(bool),
    Name(String),
}

// `null` reads as off, like an absent key.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualOptions {
    #[serde(alias = "aumentar_escala")]
    pub increase_scale: ScaleLevel,
    #[serde(alias = "daltonismo_tipo")]
    pub colorblindness_type: Colorblindness,
    #[serde(alias = "cegueira_total", deserialize_with = "flag")]
    pub total_blindness: bool,
    #[serde(alias = "sensibilidade_luz", deserialize_with = "flag")]
    pub light_sensitivity: bool,
    /// Takes precedence over `colorblindness_type`.
    #[serde(alias = "hipersensibilidade_visual", deserialize_with = "flag")]
    pub visual_hypersensitivity: bool,
    #[serde(alias = "alto_contraste", deserialize_with = "flag")]
    pub high_contrast: bool,
    #[serde(alias = "audiodescricao", deserialize_with = "flag")]
    pub audio_description: bool,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditoryOptions {
    #[serde(alias = "transcricao_surdez", deserialize_with = "flag")]
    pub deafness_transcription: bool,
    #[serde(alias = "desativar_autoplay", deserialize_with = "flag")]
    pub disable_autoplay: bool,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

pub const DEFAULT_PROGRESS_PERCENT: u8 = 25;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CognitiveOptions {
    #[serde(alias = "fonte_legivel", deserialize_with = "flag")]
    pub readable_font: bool,
    #[serde(alias = "simplificar_texto", deserialize_with = "flag")]
    pub simplify_text: bool,
    #[serde(alias = "barra_progresso", deserialize_with = "flag")]
    pub progress_bar: bool,
    /// Fill level of the progress indicator, clamped to 100.
    pub progress_percent: u8,
    #[serde(alias = "destaque_botoes", deserialize_with = "flag")]
    pub highlight_buttons: bool,
    #[serde(alias = "diminuir_espacamento", deserialize_with = "flag")]
    pub reduce_spacing: bool,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl Default for CognitiveOptions {
    fn default() -> Self {
        Self {
            readable_font: false,
            simplify_text: false,
            progress_bar: false,
            progress_percent: DEFAULT_PROGRESS_PERCENT,
            highlight_buttons: false,
            reduce_spacing: false,
            unknown: BTreeMap::new(),
        }
    }
}

/// A resolved accessibility profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Visual(VisualOptions),
    Auditory(AuditoryOptions),
    Cognitive(CognitiveOptions),
}

/// One accepted profile identifier, for listings.
#[derive(Debug, Clone, Copy)]
pub struct ProfileEntry {
    pub id: &'static str,
    pub aliases: &'static [&'static str],
    /// The profile it resolves to.
    pub resolves_to: &'static str,
    /// Options the identifier switches on by itself.
    pub presets: &'static [&'static str],
    /// Options read from the request's config.
    pub options: &'static [&'static str],
}

const VISUAL_KEYS: &[&str] = &[
    "increase_scale",
    "colorblindness_type",
    "total_blindness",
    "light_sensitivity",
    "visual_hypersensitivity",
    "high_contrast",
    "audio_description",
];
const AUDITORY_KEYS: &[&str] = &["deafness_transcription", "disable_autoplay"];
const COGNITIVE_KEYS: &[&str] = &[
    "readable_font",
    "simplify_text",
    "progress_bar",
    "progress_percent",
    "highlight_buttons",
    "reduce_spacing",
];

pub const CATALOG: &[ProfileEntry] = &[
    ProfileEntry {
        id: "visual",
        aliases: &[],
        resolves_to: "visual",
        presets: &[],
        options: VISUAL_KEYS,
    },
    ProfileEntry {
        id: "auditory",
        aliases: &["auditivo"],
        resolves_to: "auditory",
        presets: &[],
        options: AUDITORY_KEYS,
    },
    ProfileEntry {
        id: "cognitive",
        aliases: &["cognitivo"],
        resolves_to: "cognitive",
        presets: &[],
        options: COGNITIVE_KEYS,
    },
    ProfileEntry {
        id: "blind",
        aliases: &["cego"],
        resolves_to: "visual",
        presets: &["total_blindness"],
        options: VISUAL_KEYS,
    },
    ProfileEntry {
        id: "low_vision",
        aliases: &["visao_limitada"],
        resolves_to: "visual",
        presets: &["need: increase_text | protanopia | deuteranopia"],
        options: VISUAL_KEYS,
    },
    ProfileEntry {
        id: "high_contrast",
        aliases: &["alto_contraste"],
        resolves_to: "visual",
        presets: &["high_contrast"],
        options: VISUAL_KEYS,
    },
    ProfileEntry {
        id: "narration_for_blind",
        aliases: &["narracao_cegos"],
        resolves_to: "visual",
        presets: &["audio_description"],
        options: VISUAL_KEYS,
    },
    ProfileEntry {
        id: "deaf",
        aliases: &["surdo"],
        resolves_to: "auditory",
        presets: &["deafness_transcription"],
        options: AUDITORY_KEYS,
    },
    ProfileEntry {
        id: "dyslexia",
        aliases: &["dislexia"],
        resolves_to: "cognitive",
        presets: &["readable_font", "simplify_text"],
        options: COGNITIVE_KEYS,
    },
];

impl Profile {
    /// Resolve a profile identifier (or legacy alias) against its option map.
    pub fn resolve(id: &str, config: &Map<String, Value>) -> AdaptResult<Self> {
        let key = id.trim().to_ascii_lowercase();
        let profile = match key.as_str() {
            "visual" => Profile::Visual(options(&key, config)?),
            "auditory" | "auditivo" => Profile::Auditory(options(&key, config)?),
            "cognitive" | "cognitivo" => Profile::Cognitive(options(&key, config)?),
            "blind" | "cego" => {
                let mut opts: VisualOptions = options(&key, config)?;
                opts.total_blindness = true;
                Profile::Visual(opts)
            }
            "low_vision" | "visao_limitada" => {
                let mut opts: VisualOptions = options(&key, config)?;
                apply_low_vision_need(&key, &mut opts)?;
                Profile::Visual(opts)
            }
            "high_contrast" | "alto_contraste" => {
                let mut opts: VisualOptions = options(&key, config)?;
                opts.high_contrast = true;
                Profile::Visual(opts)
            }
            "narration_for_blind" | "narracao_cegos" => {
                let mut opts: VisualOptions = options(&key, config)?;
                opts.audio_description = true;
                Profile::Visual(opts)
            }
            "deaf" | "surdo" => {
                let mut opts: AuditoryOptions = options(&key, config)?;
                opts.deafness_transcription = true;
                Profile::Auditory(opts)
            }
            "dyslexia" | "dislexia" => {
                let mut opts: CognitiveOptions = options(&key, config)?;
                opts.readable_font = true;
                opts.simplify_text = true;
                Profile::Cognitive(opts)
            }
            _ => return Err(AdaptError::UnknownProfile(id.to_string())),
        };

        let unknown = profile.unknown_keys();
        if !unknown.is_empty() {
            tracing::debug!("Ignoring unrecognized {} options: {unknown:?}", profile.name());
        }
        Ok(profile)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Visual(_) => "visual",
            Profile::Auditory(_) => "auditory",
            Profile::Cognitive(_) => "cognitive",
        }
    }

    fn unknown_keys(&self) -> Vec<&str> {
        let unknown = match self {
            Profile::Visual(o) => &o.unknown,
            Profile::Auditory(o) => &o.unknown,
            Profile::Cognitive(o) => &o.unknown,
        };
        unknown.keys().map(String::as_str).collect()
    }

    /// The enabled modules, in execution order.
    pub fn plan(&self) -> Vec<Module> {
        let mut plan = Vec::new();
        match self {
            Profile::Visual(o) => {
                if o.increase_scale != ScaleLevel::None {
                    plan.push(Module::TextScale(o.increase_scale));
                }
                if o.visual_hypersensitivity {
                    plan.push(Module::VisualHypersensitivity);
                } else if o.colorblindness_type != Colorblindness::None {
                    plan.push(Module::ColorblindFilter(o.colorblindness_type));
                }
                if o.light_sensitivity {
                    plan.push(Module::LightSensitivity);
                }
                if o.high_contrast {
                    plan.push(Module::HighContrast);
                }
                if o.total_blindness {
                    plan.extend([Module::AltText, Module::AriaRoles, Module::FormLabels]);
                }
                if o.audio_description {
                    plan.push(Module::AudioDescription);
                }
            }
            Profile::Auditory(o) => {
                if o.disable_autoplay {
                    plan.push(Module::AutoplaySuppression);
                }
                if o.deafness_transcription {
                    plan.push(Module::Transcription);
                }
            }
            Profile::Cognitive(o) => {
                if o.readable_font {
                    plan.push(Module::ReadableFont);
                }
                if o.highlight_buttons {
                    plan.push(Module::ButtonHighlight);
                }
                if o.reduce_spacing {
                    plan.push(Module::CompactSpacing);
                }
                if o.simplify_text {
                    plan.push(Module::TextSimplification);
                }
                if o.progress_bar {
                    plan.push(Module::ProgressIndicator(o.progress_percent.min(100)));
                }
            }
        }
        plan
    }
}

fn options<T: DeserializeOwned>(profile: &str, config: &Map<String, Value>) -> AdaptResult<T> {
    serde_json::from_value(Value::Object(config.clone())).map_err(|e| AdaptError::InvalidConfig {
        profile: profile.to_string(),
        message: e.to_string(),
    })
}

/// The legacy low-vision profile names its need in a `need` key.
fn apply_low_vision_need(profile: &str, opts: &mut VisualOptions) -> AdaptResult<()> {
    let invalid = |message: String| AdaptError::InvalidConfig {
        profile: profile.to_string(),
        message,
    };
    let need = ["need", "necessidade"]
        .iter()
        .find_map(|key| opts.unknown.remove(*key))
        .ok_or_else(|| invalid("missing 'need' (increase_text, protanopia or deuteranopia)".into()))?;
    let need = need
        .as_str()
        .ok_or_else(|| invalid(format!("'need' must be a string, got {need}")))?;

    match need.trim().to_ascii_lowercase().as_str() {
        "increase_text" | "aumentar_texto" => {
            if opts.increase_scale == ScaleLevel::None {
                opts.increase_scale = ScaleLevel::Moderate;
            }
        }
        "protanopia" => opts.colorblindness_type = Colorblindness::Protanopia,
        "deuteranopia" => opts.colorblindness_type = Colorblindness::Deuteranopia,
        other => return Err(invalid(format!("unknown low-vision need '{other}'"))),
    }
    Ok(())
}
