//! Theme and design-token builder.
//!
//! Colour palettes are ordered arrays (lightest to darkest for a light scheme).
//! A template maps slot names (`background`, `color`, ...) to positions in a
//! palette; building a theme resolves every slot to a concrete colour.
//!
//! Child themes are named `{parent}_{sub}`. Masked themes derive from their
//! already-built parent by rewriting its template, so they run after every
//! other theme. Everything is built once at startup and shared read-only.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{Result, TutorError};

pub type Palette = Vec<String>;
pub type Template = BTreeMap<String, Slot>;
pub type Theme = BTreeMap<String, String>;

/// Where a template slot takes its value from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Slot {
  /// Index into the palette; negative counts back from the last entry.
  Offset(i32),
  /// `n` entries before the last one. `FromEnd(0)` is the last colour.
  FromEnd(u32),
  /// A position in another palette, looked up by name then as `{scheme}_{name}`.
  Alt { palette: String, index: i32 },
  Literal(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mask {
  /// Move every palette position `n` steps further from its end.
  Soften(i32),
  /// Mirror every palette position.
  Inverse,
  /// Replace slots with fixed values.
  Override(Theme),
}

impl Mask {
  fn apply(&self, template: &Template, skip: &BTreeSet<String>) -> Template {
    let mut out: Template = template
      .iter()
      .map(|(key, slot)| {
        if skip.contains(key) {
          return (key.clone(), slot.clone());
        }
        let next = match (self, slot) {
          (Mask::Soften(n), Slot::Offset(i)) if *i >= 0 => Slot::Offset(i + n),
          (Mask::Soften(n), Slot::Offset(i)) => Slot::Offset(i - n),
          (Mask::Soften(n), Slot::FromEnd(k)) => Slot::FromEnd((*k as i32 + n).max(0) as u32),
          (Mask::Inverse, Slot::Offset(i)) if *i >= 0 => Slot::FromEnd(*i as u32),
          (Mask::Inverse, Slot::Offset(i)) => Slot::Offset(-i),
          (Mask::Inverse, Slot::FromEnd(k)) => Slot::Offset(*k as i32),
          (Mask::Override(values), _) => match values.get(key) {
            Some(v) => Slot::Literal(v.clone()),
            None => slot.clone(),
          },
          _ => slot.clone(),
        };
        (key.clone(), next)
      })
      .collect();
    if let Mask::Override(values) = self {
      for (key, v) in values {
        if !skip.contains(key) {
          out.entry(key.clone()).or_insert_with(|| Slot::Literal(v.clone()));
        }
      }
    }
    out
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ThemeKind {
  FromPalette {
    palette: String,
    template: String,
    /// Copied onto the theme as-is and never touched by masks.
    non_inherited: Theme,
  },
  Fixed(Theme),
  Masked {
    mask: String,
    skip: BTreeSet<String>,
  },
}

/// One candidate definition. Child themes may list several; the first whose
/// `parent` matches the parent theme name wins.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeDef {
  pub parent: Option<String>,
  pub avoid_nesting_within: Vec<String>,
  pub kind: ThemeKind,
}

impl ThemeDef {
  pub fn palette(palette: &str, template: &str) -> Self {
    Self::of(ThemeKind::FromPalette {
      palette: palette.into(),
      template: template.into(),
      non_inherited: Theme::new(),
    })
  }

  pub fn fixed(values: &[(&str, &str)]) -> Self {
    Self::of(ThemeKind::Fixed(theme_of(values)))
  }

  pub fn masked(mask: &str, skip: &[&str]) -> Self {
    Self::of(ThemeKind::Masked {
      mask: mask.into(),
      skip: skip.iter().map(|s| s.to_string()).collect(),
    })
  }

  pub fn under(mut self, parent: &str) -> Self {
    self.parent = Some(parent.into());
    self
  }

  pub fn avoiding(mut self, names: &[&str]) -> Self {
    self.avoid_nesting_within = names.iter().map(|s| s.to_string()).collect();
    self
  }

  fn of(kind: ThemeKind) -> Self {
    Self { parent: None, avoid_nesting_within: Vec::new(), kind }
  }

  fn matches_parent(&self, parent_name: &str) -> bool {
    match &self.parent {
      Some(p) => parent_name.ends_with(p.as_str()) || parent_name.starts_with(p.as_str()),
      None => true,
    }
  }
}

/// Process-wide identity cache: equal inputs give the same `Arc`.
#[derive(Debug, Default)]
pub struct ThemeCache {
  entries: Mutex<HashMap<String, Arc<Theme>>>,
}

impl ThemeCache {
  pub fn len(&self) -> usize {
    self.entries.lock().map(|m| m.len()).unwrap_or(0)
  }

  /// Resolve `template` against `palette`. Alt slots must already be resolved.
  pub fn create(&self, name: &str, palette: &[String], template: &Template, non_inherited: &Theme) -> Result<Arc<Theme>> {
    let key = serde_json::to_string(&(name, palette, template, non_inherited))
      .map_err(|e| TutorError::Theme(e.to_string()))?;
    let mut entries = self.entries.lock().map_err(|_| TutorError::Theme("theme cache poisoned".into()))?;
    if let Some(hit) = entries.get(&key) {
      return Ok(Arc::clone(hit));
    }
    let mut theme = Theme::new();
    for (slot_name, slot) in template {
      theme.insert(slot_name.clone(), get_value(palette, slot)?);
    }
    theme.extend(non_inherited.iter().map(|(k, v)| (k.clone(), v.clone())));
    let theme = Arc::new(theme);
    entries.insert(key, Arc::clone(&theme));
    Ok(theme)
  }
}

/// Look one slot up in a palette. Positions clamp into the palette bounds.
pub fn get_value(palette: &[String], slot: &Slot) -> Result<String> {
  let index = match slot {
    Slot::Literal(v) => return Ok(v.clone()),
    Slot::Alt { palette: name, .. } => {
      return Err(TutorError::Theme(format!("unresolved alt palette reference: {name}")))
    }
    Slot::Offset(i) => *i as i64,
    Slot::FromEnd(n) => -(*n as i64),
  };
  if palette.is_empty() {
    return Err(TutorError::Theme("empty palette".into()));
  }
  let max = palette.len() as i64 - 1;
  let next = match slot {
    Slot::Offset(i) if *i >= 0 => index,
    _ => max + index,
  };
  Ok(palette[next.clamp(0, max) as usize].clone())
}

struct BuiltInfo {
  palette: Arc<Palette>,
  template: Template,
  non_inherited: Theme,
}

#[derive(Default)]
pub struct ThemeBuilder {
  palettes: BTreeMap<String, Arc<Palette>>,
  templates: BTreeMap<String, Template>,
  masks: BTreeMap<String, Mask>,
  themes: BTreeMap<String, Vec<ThemeDef>>,
  cache: Arc<ThemeCache>,
}

impl ThemeBuilder {
  pub fn new(cache: Arc<ThemeCache>) -> Self {
    Self { cache, ..Self::default() }
  }

  pub fn add_palette(mut self, name: &str, colors: &[&str]) -> Self {
    self.palettes.insert(name.into(), Arc::new(colors.iter().map(|c| c.to_string()).collect()));
    self
  }

  pub fn add_template(mut self, name: &str, slots: Vec<(&str, Slot)>) -> Self {
    self.templates.insert(name.into(), slots.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
    self
  }

  pub fn add_mask(mut self, name: &str, mask: Mask) -> Self {
    self.masks.insert(name.into(), mask);
    self
  }

  pub fn add_theme(mut self, name: &str, def: ThemeDef) -> Self {
    self.themes.insert(name.into(), vec![def]);
    self
  }

  /// Add `{existing}_{sub}` for every theme defined so far.
  pub fn add_child_themes(mut self, children: Vec<(&str, Vec<ThemeDef>)>, avoid_nesting_within: &[&str]) -> Self {
    let avoided = |prefix: &str, names: &[String]| {
      names.iter().any(|n| prefix.starts_with(n.as_str()) || prefix.ends_with(n.as_str()))
    };
    let global: Vec<String> = avoid_nesting_within.iter().map(|s| s.to_string()).collect();
    let mut added = Vec::new();
    for prefix in self.themes.keys() {
      if avoided(prefix.as_str(), global.as_slice()) {
        continue;
      }
      for (sub, defs) in &children {
        let defs: Vec<ThemeDef> = defs.iter().filter(|d| !avoided(prefix.as_str(), d.avoid_nesting_within.as_slice())).cloned().collect();
        if !defs.is_empty() {
          added.push((format!("{prefix}_{sub}"), defs));
        }
      }
    }
    self.themes.extend(added);
    self
  }

  #[instrument(level = "debug", skip_all, fields(themes = self.themes.len()))]
  pub fn build(&self) -> Result<BTreeMap<String, Arc<Theme>>> {
    let mut out = BTreeMap::new();
    let mut infos: HashMap<String, BuiltInfo> = HashMap::new();
    let mut masked = Vec::new();

    for (name, defs) in &self.themes {
      let parent_name = parent_of(name);
      let Some(def) = defs.iter().find(|d| d.matches_parent(parent_name)) else {
        debug!(target: "tutor_backend", theme = %name, parent = %parent_name, "No definition matches parent, skipped");
        continue;
      };
      match &def.kind {
        ThemeKind::Fixed(values) => {
          out.insert(name.clone(), Arc::new(values.clone()));
        }
        ThemeKind::Masked { mask, skip } => masked.push((name, parent_name, mask, skip)),
        ThemeKind::FromPalette { palette, template, non_inherited } => {
          let (palette_name, palette) = self.find_palette(name, parent_name, palette)?;
          let template = self.find_template(name, template)?;
          let template = self.resolve_alts(&palette_name, template)?;
          let theme = self.cache.create(name, &palette, &template, non_inherited)?;
          out.insert(name.clone(), theme);
          infos.insert(name.clone(), BuiltInfo { palette, template, non_inherited: non_inherited.clone() });
        }
      }
    }

    // parents before their masked children
    masked.sort_by_key(|(name, ..)| name.matches('_').count());
    for (name, parent_name, mask_name, skip) in masked {
      if !out.contains_key(parent_name) {
        continue;
      }
      let mask = self.masks.get(mask_name).ok_or_else(|| TutorError::Theme(format!("no mask {mask_name}")))?;
      let info = infos
        .get(parent_name)
        .ok_or_else(|| TutorError::Theme(format!("{name}: parent {parent_name} was not built from a palette")))?;
      let mut skip = skip.clone();
      skip.extend(info.non_inherited.keys().cloned());
      let template = mask.apply(&info.template, &skip);
      let theme = self.cache.create(name, &info.palette, &template, &Theme::new())?;
      out.insert(name.clone(), theme);
      let palette = Arc::clone(&info.palette);
      infos.insert(name.clone(), BuiltInfo { palette, template, non_inherited: Theme::new() });
    }

    info!(target: "tutor_backend", themes = out.len(), cached = self.cache.len(), "Themes built");
    Ok(out)
  }

  /// Exact name first, then `{parent}_{palette}` walking up to shorter prefixes.
  fn find_palette(&self, theme: &str, parent_name: &str, palette: &str) -> Result<(String, Arc<Palette>)> {
    if let Some(p) = self.palettes.get(palette) {
      return Ok((palette.to_string(), Arc::clone(p)));
    }
    let mut attempt = format!("{parent_name}_{palette}");
    while !attempt.is_empty() {
      if let Some(p) = self.palettes.get(&attempt) {
        return Ok((attempt, Arc::clone(p)));
      }
      attempt = match attempt.rsplit_once('_') {
        Some((head, _)) => head.to_string(),
        None => String::new(),
      };
    }
    Err(TutorError::Theme(format!("no palette for theme {theme}: {palette}")))
  }

  fn find_template(&self, theme: &str, template: &str) -> Result<&Template> {
    let scheme = theme.split('_').next().unwrap_or_default();
    self
      .templates
      .get(template)
      .or_else(|| self.templates.get(&format!("{scheme}_{template}")))
      .ok_or_else(|| TutorError::Theme(format!("no template for theme {theme}: {template}")))
  }

  fn resolve_alts(&self, palette_name: &str, template: &Template) -> Result<Template> {
    let scheme = palette_name.split('_').next().unwrap_or_default();
    template
      .iter()
      .map(|(key, slot)| {
        let slot = match slot {
          Slot::Alt { palette, index } => {
            let alt = self
              .palettes
              .get(palette)
              .or_else(|| self.palettes.get(&format!("{scheme}_{palette}")))
              .ok_or_else(|| TutorError::Theme(format!("no alt palette {palette} for {key}")))?;
            Slot::Literal(get_value(alt, &Slot::Offset(*index))?)
          }
          other => other.clone(),
        };
        Ok((key.clone(), slot))
      })
      .collect()
  }
}

fn parent_of(name: &str) -> &str {
  name.rsplit_once('_').map(|(head, _)| head).unwrap_or("")
}

fn theme_of(values: &[(&str, &str)]) -> Theme {
  values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

// --- token scales ---

pub fn size_to_space(v: f64) -> f64 {
  if v == 0.0 {
    0.0
  } else if v == 2.0 {
    0.5
  } else if v == 4.0 {
    1.0
  } else if v == 8.0 {
    1.5
  } else if v <= 16.0 {
    (v * 0.333).round()
  } else {
    (v * 0.7 - 12.0).floor()
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
  pub size: BTreeMap<String, f64>,
  pub space: BTreeMap<String, f64>,
  pub radius: BTreeMap<String, f64>,
  pub z_index: BTreeMap<String, f64>,
}

const SIZE_SCALE: [(&str, f64); 29] = [
  ("0", 0.0), ("0.25", 2.0), ("0.5", 4.0), ("0.75", 8.0), ("1", 20.0), ("1.5", 24.0),
  ("2", 28.0), ("2.5", 32.0), ("3", 36.0), ("3.5", 40.0), ("4", 44.0), ("true", 44.0),
  ("4.5", 48.0), ("5", 52.0), ("6", 64.0), ("7", 74.0), ("8", 84.0), ("9", 94.0),
  ("10", 104.0), ("11", 124.0), ("12", 144.0), ("13", 164.0), ("14", 184.0), ("15", 204.0),
  ("16", 224.0), ("17", 224.0), ("18", 244.0), ("19", 264.0), ("20", 284.0),
];

const RADIUS_SCALE: [(&str, f64); 14] = [
  ("0", 0.0), ("1", 3.0), ("2", 5.0), ("3", 7.0), ("4", 9.0), ("true", 9.0), ("5", 10.0),
  ("6", 16.0), ("7", 19.0), ("8", 22.0), ("9", 26.0), ("10", 34.0), ("11", 42.0), ("12", 50.0),
];

impl Tokens {
  pub fn standard() -> Self {
    let to_map = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> { pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect() };
    let mut space: BTreeMap<String, f64> = SIZE_SCALE.iter().map(|(k, v)| (k.to_string(), size_to_space(*v))).collect();
    // negative space for every step except the zero step
    for (k, v) in SIZE_SCALE.iter().skip(1) {
      space.insert(format!("-{k}"), -size_to_space(*v));
    }
    Self {
      size: to_map(&SIZE_SCALE),
      space,
      radius: to_map(&RADIUS_SCALE),
      z_index: (0..=5).map(|i| (i.to_string(), f64::from(i * 100))).collect(),
    }
  }
}

// --- app themes ---

const LIGHT: [&str; 12] = [
  "#ffffff", "#f8f8f8", "hsl(0, 0%, 96.3%)", "hsl(0, 0%, 94.1%)", "hsl(0, 0%, 92.0%)", "hsl(0, 0%, 90.0%)",
  "hsl(0, 0%, 88.5%)", "hsl(0, 0%, 81.0%)", "hsl(0, 0%, 56.1%)", "hsl(0, 0%, 50.3%)", "hsl(0, 0%, 42.5%)", "hsl(0, 0%, 9.0%)",
];
const DARK: [&str; 12] = [
  "#050505", "#151515", "#191919", "#232323", "#282828", "#323232",
  "#424242", "#494949", "#545454", "#626262", "#a5a5a5", "#ffffff",
];
const LIGHT_BLUE: [&str; 12] = [
  "hsl(206, 100%, 99.2%)", "hsl(210, 100%, 98.0%)", "hsl(209, 100%, 96.5%)", "hsl(210, 98.8%, 94.0%)",
  "hsl(209, 95.0%, 90.1%)", "hsl(209, 81.2%, 84.5%)", "hsl(208, 77.5%, 76.9%)", "hsl(206, 81.9%, 65.3%)",
  "hsl(206, 100%, 50.0%)", "hsl(208, 100%, 47.3%)", "hsl(211, 100%, 43.2%)", "hsl(211, 100%, 15.0%)",
];
const DARK_BLUE: [&str; 12] = [
  "hsl(212, 35.0%, 9.2%)", "hsl(216, 50.0%, 11.8%)", "hsl(214, 59.4%, 15.3%)", "hsl(214, 65.8%, 17.9%)",
  "hsl(213, 71.2%, 20.2%)", "hsl(212, 77.4%, 23.1%)", "hsl(211, 85.1%, 27.4%)", "hsl(211, 89.7%, 34.1%)",
  "hsl(206, 100%, 50.0%)", "hsl(209, 100%, 60.6%)", "hsl(210, 100%, 66.1%)", "hsl(206, 98.0%, 95.8%)",
];

/// Light/dark base themes, an accent child, softened and inverse variants,
/// and dimmed overlays for sheets and dialogs.
pub fn app_theme_builder(cache: Arc<ThemeCache>) -> ThemeBuilder {
  use Slot::*;
  ThemeBuilder::new(cache)
    .add_palette("light", &LIGHT)
    .add_palette("dark", &DARK)
    .add_palette("light_blue", &LIGHT_BLUE)
    .add_palette("dark_blue", &DARK_BLUE)
    .add_template(
      "base",
      vec![
        ("background", Offset(1)),
        ("backgroundHover", Offset(2)),
        ("backgroundPress", Offset(3)),
        ("borderColor", Offset(4)),
        ("borderColorHover", Offset(5)),
        ("placeholderColor", FromEnd(3)),
        ("color", FromEnd(0)),
        ("colorHover", FromEnd(1)),
        ("accentColor", Alt { palette: "blue".into(), index: 8 }),
      ],
    )
    .add_mask("soften", Mask::Soften(1))
    .add_mask("inverse", Mask::Inverse)
    .add_mask("overlay", Mask::Override(theme_of(&[("shadowColor", "rgba(0,0,0,0.3)")])))
    .add_theme("light", ThemeDef::palette("light", "base"))
    .add_theme("dark", ThemeDef::palette("dark", "base"))
    .add_child_themes(vec![("accent", vec![ThemeDef::palette("blue", "base")])], &[])
    .add_child_themes(
      vec![
        ("soft", vec![ThemeDef::masked("soften", &["color"])]),
        ("inverse", vec![ThemeDef::masked("inverse", &[]).avoiding(&["accent"])]),
        ("Card", vec![ThemeDef::masked("overlay", &[])]),
      ],
      &[],
    )
    .add_child_themes(
      vec![(
        "DialogOverlay",
        vec![
          ThemeDef::fixed(&[("background", "rgba(0,0,0,0.5)")]).under("light"),
          ThemeDef::fixed(&[("background", "rgba(0,0,0,0.8)")]).under("dark"),
        ],
      )],
      &["soft", "inverse", "Card"],
    )
}
