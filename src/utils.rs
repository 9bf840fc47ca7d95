use crate::ga::Evolution;

/// Logs at info level, dropping ANSI escape sequences when colors are disabled
#[macro_export]
macro_rules! cinfo {
    ($colorful:expr, $($arg:tt)*) => {
        if $colorful {
            log::info!($($arg)*)
        } else {
            log::info!("{}", $crate::utils::strip_ansi(&format!($($arg)*)))
        }
    };
}

/// Removes CSI escape sequences (`ESC [ ... final byte`) from a string
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // parameters and intermediates end at the first byte in 0x40..=0x7e
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn display_generation_legend() -> String {
    "\x1b[2mGeneration | mutation chance | best individual (distance) | mean distance\x1b[0m"
        .to_string()
}

/// One progress line describing the current state of a run
pub fn display_generation(evolution: &Evolution) -> String {
    let target = evolution.config().target;
    let population = evolution.population();
    let best = match population.fittest(&target) {
        Some((individual, distance)) => format!(
            "\x1b[38;2;{};{};{}m\u{25a0}\x1b[0m {} ({:.2})",
            individual.color[0], individual.color[1], individual.color[2], individual, distance
        ),
        None => "-".to_string(),
    };
    format!(
        "\x1b[1;93m#{}\x1b[0m | {:.2}% | {} | {:.2}",
        evolution.generation(),
        evolution.mutation_chance() * 100.0,
        best,
        population.mean_distance(&target)
    )
}
