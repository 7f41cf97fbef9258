//! Letterhead and document styling profiles.
//!
//! A [`BrandRegistry`] is built once and handed to the renderer by
//! reference. Brands never influence monetary values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in PDF font family used for every text run of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Base-14 font name for the regular or bold face.
    pub fn base_font(self, bold: bool) -> &'static str {
        match (self, bold) {
            (Self::Helvetica, false) => "Helvetica",
            (Self::Helvetica, true) => "Helvetica-Bold",
            (Self::Times, false) => "Times-Roman",
            (Self::Times, true) => "Times-Bold",
            (Self::Courier, false) => "Courier",
            (Self::Courier, true) => "Courier-Bold",
        }
    }
}

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const SLATE_900: Rgb = Rgb(15, 23, 42);
    pub const SLATE_800: Rgb = Rgb(30, 41, 59);
    pub const SLATE_400: Rgb = Rgb(148, 163, 184);
    pub const SLATE_200: Rgb = Rgb(226, 232, 240);
    pub const SLATE_100: Rgb = Rgb(241, 245, 249);
    pub const SKY_500: Rgb = Rgb(14, 165, 233);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Channels scaled to `0.0..=1.0`.
    pub fn unit(self) -> [f32; 3] {
        [self.0, self.1, self.2].map(|c| f32::from(c) / 255.0)
    }
}

/// One letterhead profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub key: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// GSTIN printed in the header.
    pub tax_id: String,
    pub font: FontFamily,
    pub header_size: f32,
    pub body_size: f32,
    /// Colour of the grand total figure.
    pub accent: Rgb,
    /// Fill of table header rows.
    pub header_fill: Rgb,
    /// Used when the invoice has no place of supply.
    pub place_of_supply: String,
    /// Numbered terms printed at the foot of every invoice.
    pub terms: Vec<String>,
}

impl Brand {
    /// The publisher's house letterhead.
    pub fn house() -> Self {
        Self {
            key: "garani".into(),
            name: "GARANI PUBLICATION".into(),
            address: "Old No.5A, New E351, 7th A Main Road, MSR Layout, Havanuru Layout, \
                      Bengaluru Urban, Bengaluru, Karnataka, 560073"
                .into(),
            phone: "Mobile: 9108447657".into(),
            tax_id: "29CBIPN0092E1ZM".into(),
            font: FontFamily::Helvetica,
            header_size: 16.0,
            body_size: 9.0,
            accent: Rgb::SKY_500,
            header_fill: Rgb::SLATE_800,
            place_of_supply: "Karnataka".into(),
            terms: vec![
                "Goods once sold will not be taken back or exchanged".into(),
                "All disputes are subject to Bengaluru jurisdiction only".into(),
            ],
        }
    }

    /// House details set in a serif face with a monochrome palette.
    pub fn classic() -> Self {
        Self {
            key: "classic".into(),
            font: FontFamily::Times,
            header_size: 18.0,
            body_size: 10.0,
            accent: Rgb::BLACK,
            header_fill: Rgb::SLATE_900,
            ..Self::house()
        }
    }

    /// `Mobile: …    GSTIN: …` line under the address.
    pub fn contact_line(&self) -> String {
        let gstin = if self.tax_id.trim().is_empty() {
            String::new()
        } else {
            format!("GSTIN: {}", self.tax_id.trim())
        };
        [self.phone.trim(), gstin.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("    ")
    }
}

/// Brands by key, with a fallback for unknown keys.
#[derive(Debug, Clone)]
pub struct BrandRegistry {
    brands: BTreeMap<String, Brand>,
    default_key: String,
}

impl BrandRegistry {
    /// Registry whose only brand (and default) is `brand`.
    pub fn new(brand: Brand) -> Self {
        let default_key = brand.key.clone();
        let mut brands = BTreeMap::new();
        brands.insert(default_key.clone(), brand);
        Self { brands, default_key }
    }

    /// House brand (default) plus the classic variant.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Brand::house());
        registry.register(Brand::classic());
        registry
    }

    /// Add or replace a brand.
    pub fn register(&mut self, brand: Brand) {
        self.brands.insert(brand.key.clone(), brand);
    }

    /// Make an already registered brand the fallback. Returns `false` if
    /// `key` is unknown.
    pub fn set_default(&mut self, key: &str) -> bool {
        if self.brands.contains_key(key) {
            self.default_key = key.to_string();
            true
        } else {
            false
        }
    }

    pub fn default_brand(&self) -> &Brand {
        // the default key is only ever set to a registered key
        &self.brands[&self.default_key]
    }

    /// Brand for `key`, or the default brand.
    pub fn get(&self, key: Option<&str>) -> &Brand {
        key.and_then(|k| self.brands.get(k))
            .unwrap_or_else(|| self.default_brand())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }
}

impl Default for BrandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
