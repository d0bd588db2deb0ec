use crate::models::Habit;
use rand::Rng;

pub const PASTEL_COLORS: [&str; 10] = [
    "#BDE0FE", "#A2D2FF", "#FFC8DD", "#FFAFCC", "#CDB4DB", "#E9EDC9", "#CCD5AE", "#D4A373",
    "#FAEDCD", "#FEFAE0",
];

pub const DEFAULT_HABIT_NAME: &str = "New Habit";
pub const DEFAULT_HABIT_EMOJI: &str = "✨";

/// Source of uniform indices, swapped for a fixed sequence in tests.
pub trait RandomSource: Send {
    /// Returns a value in `0..upper`. `upper` is never zero.
    fn pick(&mut self, upper: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

pub fn pick_color(rng: &mut dyn RandomSource) -> &'static str {
    PASTEL_COLORS[rng.pick(PASTEL_COLORS.len()) % PASTEL_COLORS.len()]
}

pub fn starter_habits() -> Vec<Habit> {
    [
        ("1", "Morning Meditation", "🧘", "#BDE0FE"),
        ("2", "8 Glasses of Water", "💧", "#A2D2FF"),
        ("3", "Read 20 Pages", "📖", "#FFC8DD"),
        ("4", "No Social Media", "📵", "#FFAFCC"),
        ("5", "Stretch / Exercise", "🏃", "#CDB4DB"),
    ]
    .into_iter()
    .map(|(id, name, emoji, color)| Habit {
        id: id.to_string(),
        name: name.to_string(),
        emoji: emoji.to_string(),
        color: color.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_palette() {
        let mut rng = ThreadRandom;
        for _ in 0..200 {
            assert!(PASTEL_COLORS.contains(&pick_color(&mut rng)));
        }
    }

    #[test]
    fn starter_habits_use_palette_colors() {
        let habits = starter_habits();
        assert_eq!(habits.len(), 5);
        assert!(habits.iter().all(|h| PASTEL_COLORS.contains(&h.color.as_str())));
        assert_eq!(habits[0].name, "Morning Meditation");
    }
}
