//! Loading tutor configuration (prompts, asset roots, player timing, extra problems) from TOML.
//!
//! See `TutorConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::assets::AssetSettings;
use crate::domain::Problem;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub assets: AssetSettings,
  #[serde(default)]
  pub player: PlayerSettings,
  #[serde(default)]
  pub limits: LimitSettings,
  /// Extra problems appended to the built-in catalog.
  #[serde(default)]
  pub problems: Vec<Problem>,
}

/// Prompts sent to the vision model. Defaults ask for Simplified Chinese output.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub solve_system: String,
  /// User-turn text sent next to the image (OpenAI only; Gemini gets the image alone).
  pub solve_user: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      solve_system: SOLVE_SYSTEM_PROMPT.trim().into(),
      solve_user: "Please solve this math problem and return JSON.".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
  /// Delay between consecutive drawing reveals within one step.
  pub reveal_stagger_ms: u64,
}

impl Default for PlayerSettings {
  fn default() -> Self {
    Self { reveal_stagger_ms: 250 }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
  /// Largest `/api/solve` body accepted. Phone photos sent as data URIs run
  /// well past axum's 2 MB default.
  pub solve_body_bytes: usize,
}

impl Default for LimitSettings {
  fn default() -> Self {
    Self { solve_body_bytes: 20 * 1024 * 1024 }
  }
}

const SOLVE_SYSTEM_PROMPT: &str = r##"
You are a helpful math tutor. Analyze the math problem in the image and provide a detailed step-by-step solution in CHINESE (简体中文) suitable for an animated whiteboard presentation.

Return your response as a valid JSON object with this exact structure:
{
  "title": "题目名称 (中文)",
  "steps": [
    {
      "explanation": "本步骤的详细中文解释 (可以使用 LaTeX 格式的数学符号，如 $x^2$)",
      "drawings": [
        { "id": "unique_id_1", "type": "math", "x": 50, "y": 50, "content": "x^2 + 5x + 6 = 0", "color": "#1a1a1a", "duration": 1000 }
      ]
    }
  ],
  "finalAnswer": "最终答案 (中文)"
}

Guidelines:
- All text (title, explanation, finalAnswer) MUST be in Simplified Chinese (简体中文).
- Use "type": "math" for equations and formulas; content is a LaTeX string without dollars.
- Use "type": "text" for labels and short notes. Other types: line, arrow, rect, circle, arc, highlight.
- Lines and arrows need x2/y2; rect and highlight need width/height; circle needs radius.
- Position drawings using x (0-400) and y (0-350); space lines at least 40-50 pixels apart.
- Colors: #1a1a1a (black), #4f46e5 (purple), #10b981 (green), #ef4444 (red).
- Each step should have 1-3 drawings; provide 3-6 steps total.
- Keep content concise for whiteboard display.
"##;

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "tutor_backend", %path, extra_problems = cfg.problems.len(), "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "tutor_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "tutor_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_config(s: &str) -> Result<TutorConfig, toml::de::Error> {
  toml::from_str::<TutorConfig>(s)
}
