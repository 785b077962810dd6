//! The static micro-goal catalog.

use sprig_core::types::{GoalCategory, MicroGoal};

/// Every goal the coach can propose, in fixed definition order.
static GOALS: &[MicroGoal] = &[
    MicroGoal {
        id: "walk_short_trips",
        description: "Walk or cycle for one short trip today instead of driving",
        rationale: "Short car trips are around 60% more polluting per mile. \
                    Active transport cuts emissions and is good for you too!",
        category: GoalCategory::Commute,
        xp: 10,
        badge: Some("Pedal Power"),
    },
    MicroGoal {
        id: "shorter_shower",
        description: "Take a 5-minute shorter shower today",
        rationale: "Every minute off your shower saves around 9 liters of hot \
                    water, plus the energy used to heat it.",
        category: GoalCategory::WaterConservation,
        xp: 5,
        badge: Some("Water Saver"),
    },
    MicroGoal {
        id: "lights_off",
        description: "Turn off the lights every time you leave a room today",
        rationale: "Lighting left on unnecessarily accounts for 5-10% of home \
                    energy use. Small actions add up!",
        category: GoalCategory::EnergySaving,
        xp: 5,
        badge: Some("Watt Watcher"),
    },
    MicroGoal {
        id: "leftovers_rescue",
        description: "Build one meal around leftovers instead of cooking fresh",
        rationale: "Roughly a third of food produced is wasted. Rescuing one \
                    meal keeps food (and the resources behind it) out of the bin.",
        category: GoalCategory::FoodWaste,
        xp: 10,
        badge: Some("Waste Not"),
    },
    MicroGoal {
        id: "reusable_shopping_bag",
        description: "Bring your own reusable bag when shopping today",
        rationale: "A single reusable bag can replace hundreds of plastic ones \
                    over its lifetime and keeps plastic out of oceans.",
        category: GoalCategory::ReduceReuseRecycle,
        xp: 10,
        badge: Some("Zero Waste Hero"),
    },
    MicroGoal {
        id: "plant_based_meal",
        description: "Swap one meal today for a plant-based option",
        rationale: "One meatless meal can save around 1,000 liters of water \
                    and cut your carbon footprint by roughly 1 kg.",
        category: GoalCategory::FoodChoices,
        xp: 15,
        badge: Some("Green Eater"),
    },
    MicroGoal {
        id: "air_dry_laundry",
        description: "Air dry one load of laundry instead of using the dryer",
        rationale: "A dryer cycle is one of the most energy-hungry things in \
                    the home; line drying costs nothing at all.",
        category: GoalCategory::EnergySaving,
        xp: 10,
        badge: None,
    },
];

/// Read-only lookup over the built-in goal table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalCatalog;

impl GoalCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Look up a goal by id.
    pub fn get(&self, id: &str) -> Option<&'static MicroGoal> {
        GOALS.iter().find(|goal| goal.id == id)
    }

    /// Goal ids in definition order, stable across calls.
    pub fn all_ids(&self) -> impl Iterator<Item = &'static str> {
        GOALS.iter().map(|goal| goal.id)
    }

    /// Goals in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &'static MicroGoal> {
        GOALS.iter()
    }

    pub fn len(&self) -> usize {
        GOALS.len()
    }

    pub fn is_empty(&self) -> bool {
        GOALS.is_empty()
    }
}
