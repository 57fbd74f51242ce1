//! Player-facing notices. The host decides how (and whether) to render them.

use std::fmt;

use crate::incidents::Severity;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Shown every tick while a rider waits and the driver is not in a car.
    EnterCar,
    /// Shown every tick while the rider sits in a vehicle the driver left.
    ReturnToCar,
    Incident(Severity),
    /// Quote given once the rider is onboard.
    TripQuote { distance_miles: f32, payment: i64 },
    RideSummary { rating: f32, payment: i64, tip: i64 },
    StoreFailure(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EnterCar => write!(f, "Enter a car."),
            Notice::ReturnToCar => write!(f, "Get back in the car."),
            Notice::Incident(Severity::Small) => write!(f, "That was a close one!"),
            Notice::Incident(Severity::Medium) => write!(f, "Damn it, your bumper's wrecked!"),
            Notice::Incident(Severity::Big) => {
                write!(f, "Are you kidding me?! Your car's totaled!")
            }
            Notice::TripQuote {
                distance_miles,
                payment,
            } => write!(f, "Distance: {distance_miles:.2} miles\nPayment: {payment} $"),
            Notice::RideSummary {
                rating,
                payment,
                tip,
            } => write!(f, "Rating: {rating:.1} / 5.0\nPayment: {payment} $\nTip: {tip} $"),
            Notice::StoreFailure(reason) => write!(f, "Could not save: {reason}"),
        }
    }
}
