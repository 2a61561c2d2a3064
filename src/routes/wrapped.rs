use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use chrono::Utc;
use minijinja::context;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use super::required;
use crate::{
    error::AppError,
    impact::{Impact, fiscal::summarize_by_fiscal_year},
    router::AppState,
    slides::{DonorContext, SlideState, run_loading},
    store::{
        Identifier, StoreError,
        donors::donor_history,
        volunteers::{find_volunteer, shifts_for_volunteer},
    },
};

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Donor,
    Volunteer,
}

impl Kind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "donor" => Some(Kind::Donor),
            "volunteer" => Some(Kind::Volunteer),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Kind::Donor => "donor",
            Kind::Volunteer => "volunteer",
        }
    }
}

#[derive(Deserialize)]
pub struct WrappedQuery {
    pub amount: Option<String>,
    pub hours: Option<String>,
    pub email: Option<String>,
    pub step: Option<String>,
}

impl WrappedQuery {
    fn step(&self) -> Result<usize, AppError> {
        match self.step.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Validation(format!("step must be a slide number, got '{raw}'"))
            }),
        }
    }
}

async fn load_context(
    db: &DatabaseConnection,
    kind: Kind,
    email: Option<&str>,
) -> Result<Option<DonorContext>, StoreError> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    let identifier = Identifier::parse(email);

    match kind {
        Kind::Donor => {
            let today = Utc::now().date_naive();
            Ok(donor_history(db, &identifier, today)
                .await?
                .map(|history| history.context()))
        }
        Kind::Volunteer => {
            let Some(volunteer) = find_volunteer(db, &identifier).await? else {
                return Ok(None);
            };
            let shifts = shifts_for_volunteer(db, volunteer.id).await?;
            Ok(Some(DonorContext {
                name: volunteer.display_name(),
                email: volunteer.email,
                lifetime_total: shifts.iter().map(|s| s.hours).sum(),
                gift_count: shifts.len(),
                fiscal_years: summarize_by_fiscal_year(&shifts),
            }))
        }
    }
}

fn step_link(kind: Kind, query: &WrappedQuery, step: usize) -> String {
    let mut link = format!("/wrapped/{}?step={}", kind.as_str(), step);
    let value = match kind {
        Kind::Donor => query.amount.as_ref().map(|v| ("amount", v)),
        Kind::Volunteer => query.hours.as_ref().map(|v| ("hours", v)),
    };
    for (name, value) in value
        .into_iter()
        .chain(query.email.as_ref().map(|e| ("email", e)))
    {
        link.push_str(&format!(
            "&{}={}",
            name,
            utf8_percent_encode(value, NON_ALPHANUMERIC)
        ));
    }
    link
}

/// Renders one slide. `step` is the deck position; reaching the Loading slide
/// looks up the donor or volunteer and continues to the first content slide.
pub async fn wrapped(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<WrappedQuery>,
) -> Result<Html<String>, AppError> {
    let kind = Kind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("No slides for '{kind}'")))?;
    let step = query.step()?;

    let mut slides = match kind {
        Kind::Donor => {
            SlideState::for_donation(required(query.amount.clone(), "amount")?, &state.constants)?
        }
        Kind::Volunteer => {
            SlideState::for_volunteer(required(query.hours.clone(), "hours")?, &state.constants)?
        }
    };

    if step > 0 {
        slides = slides.next();
        slides = run_loading(slides, || {
            load_context(&state.db, kind, query.email.as_deref())
        })
        .await;
        while slides.position() < step && !slides.is_last_slide() {
            slides = slides.next();
        }
    }

    let previous = slides.clone().previous();
    let next = slides.clone().next();
    let previous_link = (previous.position() != slides.position())
        .then(|| step_link(kind, &query, previous.position()));
    let next_link = (next.position() != slides.position())
        .then(|| step_link(kind, &query, next.position()));

    let volunteer = match &slides.impact {
        Impact::Volunteer(v) => Some(v),
        Impact::Donation(_) => None,
    };
    let slide = slides.current();
    let template = state.templates.get_template("slide.html")?;
    let html = template.render(context! {
        kind => kind.as_str(),
        slide => slide.name(),
        title => slide.title(),
        progress => slides.progress(),
        is_first => slides.is_first_slide(),
        is_last => slides.is_last_slide(),
        amount => slides.amount,
        impact => slides.impact.donation(),
        meals => slides.impact.meals_provided(),
        people => slides.impact.people_served(),
        volunteer => volunteer,
        personalization => &slides.personalization,
        error => &slides.error,
        previous_link => previous_link,
        next_link => next_link,
    })?;
    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_carry_the_query_forward() {
        let query = WrappedQuery {
            amount: Some("100".to_string()),
            hours: None,
            email: Some("ada+gifts@example.org".to_string()),
            step: Some("2".to_string()),
        };
        assert_eq!(
            step_link(Kind::Donor, &query, 3),
            "/wrapped/donor?step=3&amount=100&email=ada%2Bgifts%40example%2Eorg"
        );
        assert_eq!(
            step_link(Kind::Volunteer, &query, 0),
            "/wrapped/volunteer?step=0&email=ada%2Bgifts%40example%2Eorg"
        );
    }

    #[test]
    fn step_defaults_to_zero_and_rejects_text() {
        let mut query = WrappedQuery {
            amount: Some("100".to_string()),
            hours: None,
            email: None,
            step: None,
        };
        assert_eq!(query.step().unwrap(), 0);
        query.step = Some(" 4 ".to_string());
        assert_eq!(query.step().unwrap(), 4);
        query.step = Some("next".to_string());
        assert!(matches!(query.step(), Err(AppError::Validation(_))));
    }
}
