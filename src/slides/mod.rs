//! The linear slide sequence behind the impact presentation.
//!
//! A [`SlideState`] is a plain value. Every transition consumes the state and
//! returns the next one, so rendering code only ever reads it.

use std::future::Future;

use serde::Serialize;

use crate::impact::{
    Impact, ImpactConstants, ImpactError, calculate_donation_impact, calculate_volunteer_impact,
    fiscal::FiscalYearSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slide {
    Welcome,
    Loading,
    Meals,
    Nutrition,
    TimeGiving,
    People,
    Environment,
    FoodRescue,
    Volunteer,
    Partner,
    Summary,
}

impl Slide {
    pub fn name(&self) -> &'static str {
        match self {
            Slide::Welcome => "welcome",
            Slide::Loading => "loading",
            Slide::Meals => "meals",
            Slide::Nutrition => "nutrition",
            Slide::TimeGiving => "time-giving",
            Slide::People => "people",
            Slide::Environment => "environment",
            Slide::FoodRescue => "food-rescue",
            Slide::Volunteer => "volunteer",
            Slide::Partner => "partner",
            Slide::Summary => "summary",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Slide::Welcome => "Your Impact, Wrapped",
            Slide::Loading => "Crunching the numbers",
            Slide::Meals => "Meals on the table",
            Slide::Nutrition => "Nourishing food",
            Slide::TimeGiving => "The gift of time",
            Slide::People => "Neighbors served",
            Slide::Environment => "A lighter footprint",
            Slide::FoodRescue => "Food rescued",
            Slide::Volunteer => "Hands that helped",
            Slide::Partner => "Stronger together",
            Slide::Summary => "Your year in impact",
        }
    }

    fn is_content(&self) -> bool {
        !matches!(self, Slide::Welcome | Slide::Loading)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DeckError {
    #[error("a slide deck must open with Welcome then Loading")]
    MissingIntro,

    #[error("a slide deck needs at least one content slide before Summary")]
    NoContent,

    #[error("a slide deck must end with Summary")]
    MissingSummary,

    #[error("{0:?} may only appear once, in its fixed position")]
    Misplaced(Slide),
}

/// An ordered sequence of slides: Welcome, Loading, content..., Summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Result<Self, DeckError> {
        if slides.len() < 2 || slides[0] != Slide::Welcome || slides[1] != Slide::Loading {
            return Err(DeckError::MissingIntro);
        }
        if slides.last() != Some(&Slide::Summary) {
            return Err(DeckError::MissingSummary);
        }
        if slides.len() < 4 {
            return Err(DeckError::NoContent);
        }
        let body = &slides[2..slides.len() - 1];
        if let Some(slide) = body
            .iter()
            .find(|s| matches!(s, Slide::Welcome | Slide::Loading | Slide::Summary))
        {
            return Err(DeckError::Misplaced(*slide));
        }
        Ok(Self { slides })
    }

    pub fn donor() -> Self {
        Self {
            slides: vec![
                Slide::Welcome,
                Slide::Loading,
                Slide::Meals,
                Slide::Nutrition,
                Slide::People,
                Slide::Environment,
                Slide::FoodRescue,
                Slide::Partner,
                Slide::Summary,
            ],
        }
    }

    pub fn volunteer() -> Self {
        Self {
            slides: vec![
                Slide::Welcome,
                Slide::Loading,
                Slide::Meals,
                Slide::TimeGiving,
                Slide::People,
                Slide::Volunteer,
                Slide::Environment,
                Slide::Summary,
            ],
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn first_content(&self) -> usize {
        2
    }

    pub fn last(&self) -> usize {
        self.slides.len() - 1
    }

    pub fn get(&self, position: usize) -> Option<Slide> {
        self.slides.get(position).copied()
    }
}

/// Donor details shown on personalized slides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorContext {
    pub name: Option<String>,
    pub email: String,
    pub lifetime_total: f64,
    pub gift_count: usize,
    pub fiscal_years: Vec<FiscalYearSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "donor", rename_all = "snake_case")]
pub enum Personalization {
    Pending,
    Generic,
    Personalized(DonorContext),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideEvent {
    Next,
    Previous,
    Loaded(Result<Option<DonorContext>, String>),
    DismissError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideState {
    deck: SlideDeck,
    position: usize,
    pub amount: f64,
    pub impact: Impact,
    pub personalization: Personalization,
    pub error: Option<String>,
}

impl SlideState {
    pub fn new(deck: SlideDeck, amount: f64, impact: Impact) -> Self {
        Self {
            deck,
            position: 0,
            amount,
            impact,
            personalization: Personalization::Pending,
            error: None,
        }
    }

    pub fn for_donation(amount: f64, constants: &ImpactConstants) -> Result<Self, ImpactError> {
        let impact = calculate_donation_impact(amount, constants)?;
        Ok(Self::new(SlideDeck::donor(), amount, Impact::Donation(impact)))
    }

    pub fn for_volunteer(hours: f64, constants: &ImpactConstants) -> Result<Self, ImpactError> {
        let impact = calculate_volunteer_impact(hours, constants)?;
        Ok(Self::new(
            SlideDeck::volunteer(),
            hours,
            Impact::Volunteer(impact),
        ))
    }

    pub fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Slide {
        self.deck.slides[self.position]
    }

    pub fn is_first_slide(&self) -> bool {
        self.position == self.deck.first_content()
    }

    pub fn is_last_slide(&self) -> bool {
        self.position == self.deck.last()
    }

    /// One-based index and count over content slides, or `None` before them.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if !self.current().is_content() {
            return None;
        }
        let count = self.deck.len() - self.deck.first_content();
        Some((self.position - self.deck.first_content() + 1, count))
    }

    pub fn next(mut self) -> Self {
        match self.current() {
            Slide::Welcome => self.position += 1,
            Slide::Loading => {}
            _ if self.is_last_slide() => {}
            _ => self.position += 1,
        }
        self
    }

    pub fn previous(mut self) -> Self {
        if self.current().is_content() && !self.is_first_slide() {
            self.position -= 1;
        }
        self
    }

    pub fn finish_loading(mut self, outcome: Result<Option<DonorContext>, String>) -> Self {
        if self.current() != Slide::Loading {
            return self;
        }
        match outcome {
            Ok(Some(context)) => self.personalization = Personalization::Personalized(context),
            Ok(None) => self.personalization = Personalization::Generic,
            Err(message) => {
                self.personalization = Personalization::Generic;
                self.error = Some(message);
            }
        }
        self.position = self.deck.first_content();
        self
    }

    pub fn dismiss_error(mut self) -> Self {
        self.error = None;
        self
    }

    pub fn apply(self, event: SlideEvent) -> Self {
        match event {
            SlideEvent::Next => self.next(),
            SlideEvent::Previous => self.previous(),
            SlideEvent::Loaded(outcome) => self.finish_loading(outcome),
            SlideEvent::DismissError => self.dismiss_error(),
        }
    }
}

/// Resolves the Loading slide by awaiting `fetch`.
///
/// A failed fetch still advances to the content slides, showing the generic
/// impact with the error message attached.
pub async fn run_loading<F, Fut, E>(state: SlideState, fetch: F) -> SlideState
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<DonorContext>, E>>,
    E: std::fmt::Display,
{
    if state.current() != Slide::Loading {
        return state;
    }
    let outcome = match fetch().await {
        Ok(context) => Ok(context),
        Err(e) => {
            tracing::warn!("Falling back to generic impact slides: {}", e);
            Err(format!(
                "We couldn't load your giving history ({e}). Showing general impact instead."
            ))
        }
    };
    state.finish_loading(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor_state() -> SlideState {
        SlideState::for_donation(100.0, &ImpactConstants::default()).unwrap()
    }

    fn context() -> DonorContext {
        DonorContext {
            name: Some("Ada Lovelace".to_string()),
            email: "ada@example.org".to_string(),
            lifetime_total: 250.0,
            gift_count: 3,
            fiscal_years: vec![],
        }
    }

    fn at_first_content() -> SlideState {
        donor_state().next().finish_loading(Ok(None))
    }

    #[test]
    fn starts_at_welcome_and_waits_in_loading() {
        let state = donor_state();
        assert_eq!(state.current(), Slide::Welcome);
        assert_eq!(state.progress(), None);

        let state = state.next();
        assert_eq!(state.current(), Slide::Loading);
        let state = state.next();
        assert_eq!(state.current(), Slide::Loading);
        let state = state.previous();
        assert_eq!(state.current(), Slide::Loading);
    }

    #[test]
    fn previous_on_first_content_slide_is_a_no_op() {
        let state = at_first_content();
        assert!(state.is_first_slide());
        assert_eq!(state.current(), Slide::Meals);
        let again = state.clone().previous();
        assert_eq!(again, state);
    }

    #[test]
    fn next_on_summary_is_a_no_op() {
        let mut state = at_first_content();
        while !state.is_last_slide() {
            state = state.next();
        }
        assert_eq!(state.current(), Slide::Summary);
        let again = state.clone().next();
        assert_eq!(again, state);
    }

    #[test]
    fn next_then_previous_round_trips() {
        let mut state = at_first_content();
        while !state.is_last_slide() {
            let round_trip = state.clone().next().previous();
            assert_eq!(round_trip, state);
            state = state.next();
        }
    }

    #[test]
    fn progress_counts_content_slides() {
        let state = at_first_content();
        assert_eq!(state.progress(), Some((1, 7)));
        let state = state.next();
        assert_eq!(state.progress(), Some((2, 7)));
    }

    #[test]
    fn loading_personalizes_when_donor_found() {
        let state = donor_state().next().finish_loading(Ok(Some(context())));
        assert_eq!(state.current(), Slide::Meals);
        assert_eq!(
            state.personalization,
            Personalization::Personalized(context())
        );
        assert_eq!(state.error, None);
    }

    #[test]
    fn failed_load_degrades_to_generic_slides() {
        let state = donor_state()
            .next()
            .finish_loading(Err("network down".to_string()));
        assert_eq!(state.current(), Slide::Meals);
        assert_eq!(state.personalization, Personalization::Generic);
        assert_eq!(state.error.as_deref(), Some("network down"));
        assert_eq!(state.impact.meals_provided(), 83);

        let state = state.next();
        assert_eq!(state.current(), Slide::Nutrition);

        let state = state.apply(SlideEvent::DismissError);
        assert_eq!(state.error, None);
    }

    #[test]
    fn loaded_event_outside_loading_is_ignored() {
        let state = donor_state();
        let after = state.clone().apply(SlideEvent::Loaded(Ok(Some(context()))));
        assert_eq!(after, state);
    }

    #[test]
    fn custom_decks_are_validated() {
        assert_eq!(
            SlideDeck::new(vec![Slide::Meals, Slide::Summary]),
            Err(DeckError::MissingIntro)
        );
        assert_eq!(
            SlideDeck::new(vec![Slide::Welcome, Slide::Loading, Slide::Meals]),
            Err(DeckError::MissingSummary)
        );
        assert_eq!(
            SlideDeck::new(vec![Slide::Welcome, Slide::Loading, Slide::Summary]),
            Err(DeckError::NoContent)
        );
        assert_eq!(
            SlideDeck::new(vec![
                Slide::Welcome,
                Slide::Loading,
                Slide::Meals,
                Slide::Loading,
                Slide::Summary
            ]),
            Err(DeckError::Misplaced(Slide::Loading))
        );
        let deck = SlideDeck::new(vec![
            Slide::Welcome,
            Slide::Loading,
            Slide::Environment,
            Slide::Summary,
        ])
        .unwrap();
        assert_eq!(deck.len(), 4);
    }

    #[test]
    fn volunteer_deck_includes_time_giving() {
        let state = SlideState::for_volunteer(4.0, &ImpactConstants::default()).unwrap();
        assert!(state.deck().slides().contains(&Slide::TimeGiving));
        assert!(matches!(state.impact, Impact::Volunteer(_)));
    }

    #[tokio::test]
    async fn run_loading_falls_back_on_fetch_error() {
        let state = donor_state().next();
        let state = run_loading(state, || async {
            Err::<Option<DonorContext>, _>("connection refused")
        })
        .await;
        assert_eq!(state.current(), Slide::Meals);
        assert_eq!(state.personalization, Personalization::Generic);
        assert!(state.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn run_loading_outside_loading_keeps_state() {
        let state = donor_state();
        let state = run_loading(state, || async { Ok::<_, String>(Some(context())) }).await;
        assert_eq!(state.current(), Slide::Welcome);
        assert_eq!(state.personalization, Personalization::Pending);
    }
}
