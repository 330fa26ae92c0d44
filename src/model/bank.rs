use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Qualification stage of a bank in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Unknown,
    Compatible,
    Sampled,
    Converted,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 4] = [
        Stage::Unknown,
        Stage::Compatible,
        Stage::Sampled,
        Stage::Converted,
    ];

    /// The glyph shown next to a bank in list and summary views
    pub fn glyph(self) -> char {
        match self {
            Stage::Unknown => '○',
            Stage::Compatible => '◐',
            Stage::Sampled => '◇',
            Stage::Converted => '✓',
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Stage::Unknown => "unknown",
            Stage::Compatible => "compatible",
            Stage::Sampled => "sampled",
            Stage::Converted => "converted",
        }
    }

    /// Next stage when cycling forward in a form field (wraps around)
    pub fn next(self) -> Stage {
        match self {
            Stage::Unknown => Stage::Compatible,
            Stage::Compatible => Stage::Sampled,
            Stage::Sampled => Stage::Converted,
            Stage::Converted => Stage::Unknown,
        }
    }

    /// Previous stage when cycling backward in a form field (wraps around)
    pub fn prev(self) -> Stage {
        match self {
            Stage::Unknown => Stage::Converted,
            Stage::Compatible => Stage::Unknown,
            Stage::Sampled => Stage::Compatible,
            Stage::Converted => Stage::Sampled,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pasteurization equipment reported by a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteurizerType {
    #[default]
    Unknown,
    CirculatingWaterBath,
    HolderPasteurizer,
    FlashHeating,
    Other,
}

impl PasteurizerType {
    pub fn label(self) -> &'static str {
        match self {
            PasteurizerType::Unknown => "Unknown",
            PasteurizerType::CirculatingWaterBath => "Circulating Water Bath",
            PasteurizerType::HolderPasteurizer => "Holder Pasteurizer",
            PasteurizerType::FlashHeating => "Flash Heating",
            PasteurizerType::Other => "Other",
        }
    }

    pub fn next(self) -> PasteurizerType {
        match self {
            PasteurizerType::Unknown => PasteurizerType::CirculatingWaterBath,
            PasteurizerType::CirculatingWaterBath => PasteurizerType::HolderPasteurizer,
            PasteurizerType::HolderPasteurizer => PasteurizerType::FlashHeating,
            PasteurizerType::FlashHeating => PasteurizerType::Other,
            PasteurizerType::Other => PasteurizerType::Unknown,
        }
    }

    pub fn prev(self) -> PasteurizerType {
        match self {
            PasteurizerType::Unknown => PasteurizerType::Other,
            PasteurizerType::CirculatingWaterBath => PasteurizerType::Unknown,
            PasteurizerType::HolderPasteurizer => PasteurizerType::CirculatingWaterBath,
            PasteurizerType::FlashHeating => PasteurizerType::HolderPasteurizer,
            PasteurizerType::Other => PasteurizerType::FlashHeating,
        }
    }
}

impl fmt::Display for PasteurizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bottle size a bank can fill
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BottleSize {
    #[serde(rename = "120ml")]
    Ml120,
    #[serde(rename = "240ml")]
    Ml240,
    #[serde(rename = "1oz")]
    Oz1,
    #[serde(rename = "2oz")]
    Oz2,
    #[serde(rename = "4oz")]
    Oz4,
}

impl BottleSize {
    /// All sizes in display order
    pub const ALL: [BottleSize; 5] = [
        BottleSize::Ml120,
        BottleSize::Ml240,
        BottleSize::Oz1,
        BottleSize::Oz2,
        BottleSize::Oz4,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BottleSize::Ml120 => "120ml",
            BottleSize::Ml240 => "240ml",
            BottleSize::Oz1 => "1oz",
            BottleSize::Oz2 => "2oz",
            BottleSize::Oz4 => "4oz",
        }
    }
}

impl fmt::Display for BottleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked bank, one JSON document in the store collection.
///
/// Only `id`, `name`, `created_at`, and `updated_at` are required in a
/// document; everything else deserializes to its default when absent, so
/// documents written by older versions (or by hand) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// Store-assigned id, unique and immutable
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub pasteurizer: PasteurizerType,
    /// Estimated volume in bottles/month
    #[serde(default)]
    pub volume_potential: u32,
    #[serde(default)]
    pub bottle_sizes: BTreeSet<BottleSize>,
    #[serde(default)]
    pub next_action: Option<NaiveDate>,
    #[serde(default)]
    pub last_contact: Option<NaiveDate>,
    /// Set once by the create path
    pub created_at: DateTime<Utc>,
    /// Refreshed by the update path on every save
    pub updated_at: DateTime<Utc>,
}

/// User-editable fields for creating a bank.
///
/// The store's create path owns id and timestamp assignment; callers only
/// provide content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankFields {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub stage: Stage,
    pub notes: String,
    pub pasteurizer: PasteurizerType,
    pub volume_potential: u32,
    pub bottle_sizes: BTreeSet<BottleSize>,
    pub next_action: Option<NaiveDate>,
    pub last_contact: Option<NaiveDate>,
}

/// Partial update: only `Some` fields are merged into the stored document.
///
/// The edit form submits a patch with every field set ("fully replaceable"
/// is a property of the form, not of the store contract).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: Option<Stage>,
    pub notes: Option<String>,
    pub pasteurizer: Option<PasteurizerType>,
    pub volume_potential: Option<u32>,
    pub bottle_sizes: Option<BTreeSet<BottleSize>>,
    /// `Some(None)` clears the date, `None` leaves it untouched
    pub next_action: Option<Option<NaiveDate>>,
    pub last_contact: Option<Option<NaiveDate>>,
}

impl BankPatch {
    /// A patch carrying every field of `fields` (full replacement)
    pub fn from_fields(fields: BankFields) -> Self {
        BankPatch {
            name: Some(fields.name),
            location: Some(fields.location),
            contact: Some(fields.contact),
            email: Some(fields.email),
            phone: Some(fields.phone),
            stage: Some(fields.stage),
            notes: Some(fields.notes),
            pasteurizer: Some(fields.pasteurizer),
            volume_potential: Some(fields.volume_potential),
            bottle_sizes: Some(fields.bottle_sizes),
            next_action: Some(fields.next_action),
            last_contact: Some(fields.last_contact),
        }
    }
}

impl Bank {
    /// Apply a patch to this bank's user-editable fields.
    /// Timestamps are the store's concern, not the patch's.
    pub fn apply(&mut self, patch: BankPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(pasteurizer) = patch.pasteurizer {
            self.pasteurizer = pasteurizer;
        }
        if let Some(volume) = patch.volume_potential {
            self.volume_potential = volume;
        }
        if let Some(sizes) = patch.bottle_sizes {
            self.bottle_sizes = sizes;
        }
        if let Some(next_action) = patch.next_action {
            self.next_action = next_action;
        }
        if let Some(last_contact) = patch.last_contact {
            self.last_contact = last_contact;
        }
    }

    /// The user-editable fields of this bank, for seeding an edit form
    pub fn fields(&self) -> BankFields {
        BankFields {
            name: self.name.clone(),
            location: self.location.clone(),
            contact: self.contact.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            stage: self.stage,
            notes: self.notes.clone(),
            pasteurizer: self.pasteurizer,
            volume_potential: self.volume_potential,
            bottle_sizes: self.bottle_sizes.clone(),
            next_action: self.next_action,
            last_contact: self.last_contact,
        }
    }
}
