//! Conversion of donation amounts and volunteer hours into impact statistics.
//!
//! Every calculation takes an [`ImpactConstants`] value explicitly so alternate
//! almanacs can be used side by side.

pub mod fiscal;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImpactError {
    #[error("amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("hours must be a non-negative number, got {0}")]
    InvalidHours(f64),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("invalid impact constant {name}: {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

/// Per-unit figures used to derive every impact metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactConstants {
    pub meals_per_dollar: f64,
    /// Meals that feed one person for a day.
    pub meals_per_person: f64,
    pub pounds_per_meal: f64,
    pub co2_lbs_per_food_lb: f64,
    pub water_gallons_per_food_lb: f64,
    pub produce_share: f64,
    pub protein_share: f64,
    pub dairy_share: f64,
    pub pounds_sorted_per_volunteer_hour: f64,
    pub dollars_per_volunteer_hour: f64,
}

impl Default for ImpactConstants {
    fn default() -> Self {
        Self {
            meals_per_dollar: 0.833,
            meals_per_person: 3.0,
            pounds_per_meal: 1.2,
            co2_lbs_per_food_lb: 0.84,
            water_gallons_per_food_lb: 108.0,
            produce_share: 0.40,
            protein_share: 0.25,
            dairy_share: 0.15,
            pounds_sorted_per_volunteer_hour: 80.0,
            dollars_per_volunteer_hour: 33.49,
        }
    }
}

impl ImpactConstants {
    pub fn validate(&self) -> Result<(), ImpactError> {
        let per_unit = [
            ("meals_per_dollar", self.meals_per_dollar),
            ("meals_per_person", self.meals_per_person),
            ("pounds_per_meal", self.pounds_per_meal),
            ("co2_lbs_per_food_lb", self.co2_lbs_per_food_lb),
            ("water_gallons_per_food_lb", self.water_gallons_per_food_lb),
            (
                "pounds_sorted_per_volunteer_hour",
                self.pounds_sorted_per_volunteer_hour,
            ),
            ("dollars_per_volunteer_hour", self.dollars_per_volunteer_hour),
        ];
        for (name, value) in per_unit {
            if !value.is_finite() || value <= 0.0 {
                return Err(ImpactError::InvalidConstant { name, value });
            }
        }

        let shares = [
            ("produce_share", self.produce_share),
            ("protein_share", self.protein_share),
            ("dairy_share", self.dairy_share),
        ];
        for (name, value) in shares {
            if !value.is_finite() || value < 0.0 {
                return Err(ImpactError::InvalidConstant { name, value });
            }
        }
        let total = self.produce_share + self.protein_share + self.dairy_share;
        if total > 1.0 {
            return Err(ImpactError::InvalidConstant {
                name: "nutrition shares",
                value: total,
            });
        }
        Ok(())
    }

    fn other_share(&self) -> f64 {
        (1.0 - self.produce_share - self.protein_share - self.dairy_share).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionCategory {
    pub pounds: f64,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionBreakdown {
    pub produce: NutritionCategory,
    pub protein: NutritionCategory,
    pub dairy: NutritionCategory,
    pub other: NutritionCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationImpact {
    pub amount: f64,
    pub meals_provided: u64,
    pub people_served: u64,
    pub food_rescued_lbs: f64,
    pub co2_saved_lbs: f64,
    pub water_saved_gallons: u64,
    pub nutrition: NutritionBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerImpact {
    pub hours: f64,
    pub pounds_sorted: f64,
    pub meals_provided: u64,
    pub people_served: u64,
    pub value_of_time: f64,
    pub equivalent_donation_impact: DonationImpact,
}

/// Either kind of impact, as carried by the slide controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Impact {
    Donation(DonationImpact),
    Volunteer(VolunteerImpact),
}

impl Impact {
    pub fn meals_provided(&self) -> u64 {
        match self {
            Impact::Donation(d) => d.meals_provided,
            Impact::Volunteer(v) => v.meals_provided,
        }
    }

    pub fn people_served(&self) -> u64 {
        match self {
            Impact::Donation(d) => d.people_served,
            Impact::Volunteer(v) => v.people_served,
        }
    }

    /// The donation-shaped figures: the impact itself for donors, or the
    /// dollar value of donated time for volunteers.
    pub fn donation(&self) -> &DonationImpact {
        match self {
            Impact::Donation(d) => d,
            Impact::Volunteer(v) => &v.equivalent_donation_impact,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn people_for_meals(meals: u64, constants: &ImpactConstants) -> u64 {
    (meals as f64 / constants.meals_per_person).round() as u64
}

fn nutrition_for(food_lbs: f64, constants: &ImpactConstants) -> NutritionBreakdown {
    let category = |share: f64| NutritionCategory {
        pounds: round1(food_lbs * share),
        percent: (share * 100.0).round() as u32,
    };
    NutritionBreakdown {
        produce: category(constants.produce_share),
        protein: category(constants.protein_share),
        dairy: category(constants.dairy_share),
        other: category(constants.other_share()),
    }
}

pub fn calculate_donation_impact(
    amount: f64,
    constants: &ImpactConstants,
) -> Result<DonationImpact, ImpactError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ImpactError::InvalidAmount(amount));
    }

    let meals_provided = (amount * constants.meals_per_dollar).round() as u64;
    let food_rescued_lbs = round1(meals_provided as f64 * constants.pounds_per_meal);

    Ok(DonationImpact {
        amount,
        meals_provided,
        people_served: people_for_meals(meals_provided, constants),
        food_rescued_lbs,
        co2_saved_lbs: round1(food_rescued_lbs * constants.co2_lbs_per_food_lb),
        water_saved_gallons: (food_rescued_lbs * constants.water_gallons_per_food_lb).round()
            as u64,
        nutrition: nutrition_for(food_rescued_lbs, constants),
    })
}

pub fn calculate_volunteer_impact(
    hours: f64,
    constants: &ImpactConstants,
) -> Result<VolunteerImpact, ImpactError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ImpactError::InvalidHours(hours));
    }

    let pounds_sorted = round1(hours * constants.pounds_sorted_per_volunteer_hour);
    let meals_provided = (pounds_sorted / constants.pounds_per_meal).round() as u64;
    let value_of_time = round2(hours * constants.dollars_per_volunteer_hour);
    if !pounds_sorted.is_finite() || !value_of_time.is_finite() {
        return Err(ImpactError::InvalidHours(hours));
    }
    let equivalent_donation_impact = calculate_donation_impact(value_of_time, constants)
        .map_err(|_| ImpactError::InvalidHours(hours))?;

    Ok(VolunteerImpact {
        hours,
        pounds_sorted,
        meals_provided,
        people_served: people_for_meals(meals_provided, constants),
        value_of_time,
        equivalent_donation_impact,
    })
}

/// Parses user-entered money or hour values such as `"$1,250.50"` or `" 42 "`.
pub fn parse_amount(input: &str) -> Result<f64, ImpactError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ImpactError::NotANumber(input.trim().to_string()))
}
