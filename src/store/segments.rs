use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::entities::{donation, donor, prelude::*};
use crate::impact::fiscal::{Dated, FiscalYear};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentCriteria {
    pub name: String,
    pub min_total: Option<f64>,
    pub min_donations: Option<usize>,
    /// Restricts totals and counts to one fiscal year, e.g. `2025` for FY2025.
    pub fiscal_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentMember {
    pub donor_id: i32,
    pub email: String,
    pub name: Option<String>,
    pub total: f64,
    pub donation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub name: String,
    pub criteria: SegmentCriteria,
    pub donor_count: usize,
    pub donors: Vec<SegmentMember>,
}

/// Applies `criteria` to donors and their donations. Members are ordered by total, largest first.
pub fn evaluate(
    criteria: SegmentCriteria,
    donors: Vec<(donor::Model, Vec<donation::Model>)>,
) -> Segment {
    let fiscal_year = criteria.fiscal_year.map(FiscalYear);
    let mut members: Vec<SegmentMember> = donors
        .into_iter()
        .filter_map(|(donor, donations)| {
            let counted: Vec<&donation::Model> = donations
                .iter()
                .filter(|d| fiscal_year.is_none_or(|fy| fy.contains(d.date().date())))
                .collect();
            let total: f64 = counted.iter().map(|d| d.amount).sum();
            let donation_count = counted.len();

            if criteria.min_total.is_some_and(|min| total < min) {
                return None;
            }
            if criteria.min_donations.is_some_and(|min| donation_count < min) {
                return None;
            }
            if fiscal_year.is_some() && donation_count == 0 {
                return None;
            }
            Some(SegmentMember {
                donor_id: donor.id,
                name: donor.display_name(),
                email: donor.email,
                total: (total * 100.0).round() / 100.0,
                donation_count,
            })
        })
        .collect();

    members.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.email.cmp(&b.email)));

    Segment {
        name: criteria.name.clone(),
        donor_count: members.len(),
        donors: members,
        criteria,
    }
}

/// Builds an ad hoc segment. Segments are computed on request and never stored.
pub async fn segment_donors(
    db: &DatabaseConnection,
    criteria: SegmentCriteria,
) -> Result<Segment, StoreError> {
    let donors = Donor::find()
        .order_by_asc(donor::Column::Email)
        .find_with_related(Donation)
        .all(db)
        .await?;
    Ok(evaluate(criteria, donors))
}
