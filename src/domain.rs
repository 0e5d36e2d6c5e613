//! Domain Classifier: scores header vocabulary against business verticals.
//!
//! All column names are lowercased and joined into one blob; each domain
//! scores one point per keyword found anywhere in it. The highest score
//! wins, with ties going to the domain declared first in
//! [`DomainKind::SCORED`]. A header that matches nothing is `General`.

use std::fmt;

use heck::ToTitleCase;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Sales,
    RealEstate,
    Financial,
    Hr,
    Marketing,
    Inventory,
    General,
}

impl DomainKind {
    /// Domains that take part in scoring, in tie-break order.
    pub const SCORED: [DomainKind; 6] = [
        DomainKind::Sales,
        DomainKind::RealEstate,
        DomainKind::Financial,
        DomainKind::Hr,
        DomainKind::Marketing,
        DomainKind::Inventory,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            DomainKind::Sales => &[
                "sales",
                "revenue",
                "amount",
                "price",
                "product",
                "customer",
                "order",
                "transaction",
            ],
            DomainKind::RealEstate => &[
                "property",
                "address",
                "building",
                "lot",
                "square",
                "feet",
                "borough",
                "neighborhood",
            ],
            DomainKind::Financial => &[
                "balance",
                "account",
                "credit",
                "debit",
                "investment",
                "portfolio",
                "stock",
                "bond",
            ],
            DomainKind::Hr => &[
                "employee",
                "salary",
                "department",
                "hire",
                "performance",
                "review",
            ],
            DomainKind::Marketing => &[
                "campaign",
                "click",
                "impression",
                "conversion",
                "lead",
                "funnel",
            ],
            DomainKind::Inventory => &["stock", "warehouse", "supplier", "quantity", "sku", "category"],
            DomainKind::General => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DomainKind::Sales => "sales",
            DomainKind::RealEstate => "real_estate",
            DomainKind::Financial => "financial",
            DomainKind::Hr => "hr",
            DomainKind::Marketing => "marketing",
            DomainKind::Inventory => "inventory",
            DomainKind::General => "general",
        }
    }

    /// Human-facing name, e.g. `"Real Estate"`.
    pub fn title(&self) -> String {
        self.label().to_title_case()
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainScore {
    pub domain: DomainKind,
    pub matched: usize,
    pub keywords: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainInfo {
    pub domain: DomainKind,
    /// Percentage of the winning domain's keywords present, capped at 100.
    pub confidence: f64,
    pub scores: Vec<DomainScore>,
}

impl DomainInfo {
    pub fn score(&self, domain: DomainKind) -> Option<usize> {
        self.scores
            .iter()
            .find(|score| score.domain == domain)
            .map(|score| score.matched)
    }
}

pub fn detect_domain<S: AsRef<str>>(column_names: &[S]) -> DomainInfo {
    let blob = column_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let scores = DomainKind::SCORED
        .iter()
        .map(|domain| DomainScore {
            domain: *domain,
            matched: domain
                .keywords()
                .iter()
                .filter(|keyword| blob.contains(*keyword))
                .count(),
            keywords: domain.keywords().len(),
        })
        .collect::<Vec<_>>();

    let best = scores.iter().fold(None::<&DomainScore>, |best, score| match best {
        Some(current) if current.matched >= score.matched => Some(current),
        _ => Some(score),
    });

    match best {
        Some(best) if best.matched > 0 => DomainInfo {
            domain: best.domain,
            confidence: (best.matched as f64 / best.keywords as f64 * 100.0).min(100.0),
            scores,
        },
        _ => DomainInfo {
            domain: DomainKind::General,
            confidence: 0.0,
            scores,
        },
    }
}
