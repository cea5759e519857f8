use crate::foundation::core::{Canvas, Rgba8, Variant};

/// Title color family for a day's template artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleTone {
    /// Light title over a dark template.
    Light,
    /// Dark title over a light template.
    Dark,
}

impl TitleTone {
    pub fn color(self) -> Rgba8 {
        match self {
            TitleTone::Light => Rgba8::WHITE,
            TitleTone::Dark => Rgba8::BLACK,
        }
    }
}

struct DayTemplate {
    day: &'static str,
    slug: &'static str,
    title: TitleTone,
}

// Sunday has no artwork and is skipped.
const DAY_TEMPLATES: &[DayTemplate] = &[
    DayTemplate {
        day: "Segunda-feira",
        slug: "gcsegunda",
        title: TitleTone::Light,
    },
    DayTemplate {
        day: "Terça-feira",
        slug: "gcterca",
        title: TitleTone::Dark,
    },
    DayTemplate {
        day: "Quarta-feira",
        slug: "gcquarta",
        title: TitleTone::Dark,
    },
    DayTemplate {
        day: "Quinta-feira",
        slug: "gcquinta",
        title: TitleTone::Dark,
    },
    DayTemplate {
        day: "Sexta-feira",
        slug: "gcsexta",
        title: TitleTone::Dark,
    },
    DayTemplate {
        day: "Sábado",
        slug: "gcsabado",
        title: TitleTone::Dark,
    },
];

fn lookup(day: &str) -> Option<&'static DayTemplate> {
    let key = day.trim().to_lowercase();
    DAY_TEMPLATES.iter().find(|t| t.day.to_lowercase() == key)
}

/// Title tone for `day`. Days without a template entry use [`TitleTone::Dark`].
pub fn title_tone(day: &str) -> TitleTone {
    lookup(day).map_or(TitleTone::Dark, |t| t.title)
}

/// Every day value that resolves to a template.
pub fn supported_days() -> impl Iterator<Item = &'static str> {
    DAY_TEMPLATES.iter().map(|t| t.day)
}

/// Background template for one (day, variant) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateReference {
    /// File path or URL of the template image.
    pub locator: String,
    pub variant: Variant,
    /// Canvas the template is drawn onto.
    pub canvas: Canvas,
}

impl TemplateReference {
    /// Reference an explicit locator, bypassing the day table.
    pub fn explicit(locator: impl Into<String>, variant: Variant) -> Self {
        Self {
            locator: locator.into(),
            variant,
            canvas: variant.canvas(),
        }
    }
}

/// Template table rooted at a directory or URL prefix.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    root: String,
    extension: String,
}

impl TemplateSet {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: "png".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Resolve `<root>/<slug><variant>.<ext>`; `None` when the day has no template.
    pub fn resolve(&self, day: &str, variant: Variant) -> Option<TemplateReference> {
        let entry = lookup(day)?;
        let root = self.root.trim_end_matches('/');
        let locator = format!(
            "{root}/{}{}.{}",
            entry.slug,
            variant.as_str(),
            self.extension
        );
        Some(TemplateReference {
            locator,
            variant,
            canvas: variant.canvas(),
        })
    }

    /// Resolve both variants, or `None` if either misses.
    pub fn resolve_pair(&self, day: &str) -> Option<[TemplateReference; 2]> {
        Some([
            self.resolve(day, Variant::Feed)?,
            self.resolve(day, Variant::Story)?,
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/templates/resolver.rs"]
mod tests;
