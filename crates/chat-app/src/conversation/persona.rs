use rand::seq::IndexedRandom;

/// Persona instruction sent as the first entry of every outbound context.
pub const SYSTEM_PROMPT: &str = "You are a digital Socrates. \
People will share thoughts, problems, or beliefs with you. You are a sceptic. \
Ask them questions they have never considered. Shatter their worldview. \
Challenge them to reflect deeper. Do not provide a whole explanation or answer like an LLM. \
Don't be diplomatic. Confront people's biases like Socrates used to. \
Guide them towards critical thinking. Be casual. Chat with them. Be wise.";

/// Shown in place of a reply when the chat call fails for any reason.
pub const FALLBACK_MESSAGE: &str = "Hmm... something went wrong. Try again later.";

pub const WELCOME_QUOTES: &[&str] = &[
    "The unexamined life is not worth living.",
    "I know that I know nothing.",
    "Wonder is the beginning of wisdom.",
    "To find yourself, think for yourself.",
    "The only true wisdom is in knowing you know nothing.",
    "Education is the kindling of a flame, not the filling of a vessel.",
];

pub fn random_welcome_quote() -> &'static str {
    WELCOME_QUOTES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(WELCOME_QUOTES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_quote_comes_from_fixed_list() {
        for _ in 0..32 {
            assert!(WELCOME_QUOTES.contains(&random_welcome_quote()));
        }
    }

    #[test]
    fn system_prompt_sets_sceptical_persona() {
        assert!(SYSTEM_PROMPT.starts_with("You are a digital Socrates."));
        assert!(SYSTEM_PROMPT.contains("sceptic"));
    }
}
