//! Rest activity catalogue.

use serde::Serialize;

/// A suggested break the client can offer the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RestActivity {
    /// Stable identifier.
    pub id: u32,
    /// Display name.
    pub name: &'static str,
    /// Suggested duration in seconds.
    pub duration_secs: u32,
    /// What the user should do.
    pub instructions: &'static str,
}

/// The fixed catalogue.
pub const REST_ACTIVITIES: [RestActivity; 3] = [
    RestActivity {
        id: 1,
        name: "20-20-20",
        duration_secs: 20,
        instructions: "Mira algo a 6m por 20 segundos",
    },
    RestActivity {
        id: 2,
        name: "Ejercicio ocular",
        duration_secs: 30,
        instructions: "Realiza círculos con los ojos 10 veces",
    },
    RestActivity {
        id: 3,
        name: "Descanso",
        duration_secs: 60,
        instructions: "Cierra los ojos y respira profundo",
    },
];

/// Catalogue entry by id.
pub fn find(id: u32) -> Option<&'static RestActivity> {
    REST_ACTIVITIES.iter().find(|a| a.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_durations() {
        let durations: Vec<u32> = REST_ACTIVITIES.iter().map(|a| a.duration_secs).collect();
        assert_eq!(durations, [20, 30, 60]);
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(2).map(|a| a.name), Some("Ejercicio ocular"));
        assert!(find(9).is_none());
    }
}
