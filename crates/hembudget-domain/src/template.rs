//! Category templates used to seed a newly selected month.

use serde::{Deserialize, Serialize};

use crate::{
    common::NamedEntity,
    ledger::{CategoryRecord, LineItem},
};

/// A heading with the subcategory names it starts out with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateCategory {
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl TemplateCategory {
    pub fn new<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a zero-valued category record from this template entry.
    pub fn instantiate(&self) -> CategoryRecord {
        let mut record = CategoryRecord::new(self.name.clone());
        for item in &self.items {
            record.upsert_item(LineItem::new(item.clone()));
        }
        record
    }
}

impl NamedEntity for TemplateCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered list of headings; order is the display order of a seeded month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryTemplate(pub Vec<TemplateCategory>);

impl CategoryTemplate {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Small three-heading template.
    pub fn compact() -> Self {
        Self(vec![
            TemplateCategory::new("Inkomster", ["Lön", "Bidrag"]),
            TemplateCategory::new("Fasta kostnader", ["El", "Internet"]),
            TemplateCategory::new("Rörliga utgifter", ["Mat", "Utemat"]),
        ])
    }

    /// Full family template with eight headings.
    pub fn household() -> Self {
        Self(vec![
            TemplateCategory::new(
                "Inkomster",
                [
                    "Danis lön",
                    "Ankis lön",
                    "Hästförsäljning",
                    "Barnbidrag (Kela)",
                    "Mammapeng (Kela)",
                    "Hemvårdsstöd (Kela)",
                ],
            ),
            TemplateCategory::new(
                "Fasta kostnader",
                [
                    "Försäkringar",
                    "El",
                    "Internet/TV",
                    "Telefon",
                    "Ekorosk",
                    "Fastighetsskatt",
                    "Vatten/Avlopp",
                ],
            ),
            TemplateCategory::new(
                "Rörliga utgifter",
                [
                    "Mat",
                    "Gåvor",
                    "Barnkonto",
                    "Utemat",
                    "Anki",
                    "Dani",
                    "Reparation",
                ],
            ),
            TemplateCategory::new(
                "Bilen",
                [
                    "Bränsle",
                    "Försäkringar",
                    "Service",
                    "Dieselskatt",
                    "Avbetalning",
                ],
            ),
            TemplateCategory::new(
                "Avbetalningar",
                [
                    "Moas Telefon",
                    "Ottos Klocka",
                    "Ankis Telefon",
                    "Danis Klocka",
                    "Fyrhjulingen",
                ],
            ),
            TemplateCategory::new("Bank & Lån", ["Bostadslån", "Husvagnslån", "Kredit"]),
            TemplateCategory::new(
                "Kontoskötsel avgifter",
                ["Anki", "Dani", "Spar", "Leo", "Otto", "Moa", "Räknekonto"],
            ),
            TemplateCategory::new(
                "Sparande",
                [
                    "Aktia Fonder",
                    "S-Gruppens Fonder",
                    "Buffert",
                    "Nordnet Aktier",
                ],
            ),
        ])
    }

    pub fn categories(&self) -> &[TemplateCategory] {
        &self.0
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|category| category.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zero-valued category records for a fresh month.
    pub fn instantiate(&self) -> Vec<CategoryRecord> {
        let mut records: Vec<CategoryRecord> = Vec::with_capacity(self.0.len());
        for entry in &self.0 {
            match records.iter_mut().find(|record| record.is_named(&entry.name)) {
                Some(existing) => {
                    for item in &entry.items {
                        existing.upsert_item(LineItem::new(item.clone()));
                    }
                }
                None => records.push(entry.instantiate()),
            }
        }
        records
    }
}
