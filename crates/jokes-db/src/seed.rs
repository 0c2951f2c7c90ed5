use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::Database;

pub const DEMO_USERNAME: &str = "kody";

const DEMO_JOKES: &[(&str, &str)] = &[
    (
        "Road worker",
        "I never wanted to believe that my Dad was stealing from his job as a road worker. But when I got home, all the signs were there.",
    ),
    (
        "Frisbee",
        "I was wondering why the frisbee was getting bigger, then it hit me.",
    ),
    (
        "Trees",
        "Why do trees seem suspicious on sunny days? Dunno, they're just a bit shady.",
    ),
    (
        "Skeletons",
        "Why don't skeletons ride roller coasters? They don't have the stomach for it.",
    ),
    (
        "Hippos",
        "Why don't you find hippopotamuses hiding in trees? They're really good at it.",
    ),
    (
        "Dinner",
        "What did one plate say to the other plate? Dinner is on me!",
    ),
    (
        "Elevator",
        "My first time using an elevator was an uplifting experience. The second time let me down.",
    ),
];

/// Seed a demo jokester and a handful of jokes into an empty store.
/// Returns false when users already exist and nothing was written.
pub fn seed_demo_data(db: &Database, password_hash: &str) -> Result<bool> {
    if db.count_users()? > 0 {
        return Ok(false);
    }

    let user_id = Uuid::new_v4().to_string();
    if !db.create_user(&user_id, DEMO_USERNAME, password_hash)? {
        return Ok(false);
    }

    for (name, content) in DEMO_JOKES {
        db.insert_joke(&Uuid::new_v4().to_string(), &user_id, name, content)?;
    }

    info!("Seeded demo user '{}' with {} jokes", DEMO_USERNAME, DEMO_JOKES.len());
    Ok(true)
}
