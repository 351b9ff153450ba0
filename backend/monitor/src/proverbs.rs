//! Text that decorates every threshold alert.

use rand::seq::SliceRandom;

/// ASCII banner printed at the top of an alert.
pub const BANNER: &str = include_str!("../assets/yoda.txt");

/// One of these is appended to every alert, picked at random.
pub const PROVERBS: &[&str] = &[
    "Don't communicate by sharing memory, share memory by communicating.",
    "Concurrency is not parallelism.",
    "Channels orchestrate; mutexes serialize.",
    "The bigger the interface, the weaker the abstraction.",
    "Make the zero value useful.",
    "interface{} says nothing.",
    "Gofmt's style is no one's favorite, yet gofmt is everyone's favorite.",
    "A little copying is better than a little dependency.",
    "Syscall must always be guarded with build tags.",
    "Cgo must always be guarded with build tags.",
    "Cgo is not Go.",
    "With the unsafe package there are no guarantees.",
    "Clear is better than clever.",
    "Reflection is never clear.",
    "Errors are values.",
    "Don't just check errors, handle them gracefully.",
    "Design the architecture, name the components, document the details.",
    "Documentation is for users.",
    "Don't panic.",
];

pub fn random_proverb() -> &'static str {
    PROVERBS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Don't panic.")
}

/// Full alert text: banner, a proverb, then the closing line, in one code block.
pub fn compose_alert(closing: &str) -> String {
    format!("```{}\n{}\n{}```", BANNER.trim_end(), random_proverb(), closing)
}
