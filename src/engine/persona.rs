//! Persona prompt construction.
//!
//! The persona text is process-wide constant content with caller-supplied
//! overlay fields, so it is a pure function of [`PersonaContext`] — never a
//! mutable global.

/// Overlay fields for one persona prompt.
#[derive(Debug, Clone)]
pub struct PersonaContext<'a> {
    pub assistant_name: &'a str,
    pub brand: &'a str,
    pub role: Option<&'a str>,
    pub history: &'a [String],
}

/// Render the persona prompt for one request.
pub fn persona_prompt(ctx: &PersonaContext<'_>) -> String {
    let mut prompt = format!(
        "You are {name}, the {brand} product assistant. Answer only questions \
         about {brand} products, pricing, orders, and troubleshooting. Stay \
         concise and factual; when prior knowledge is provided, prefer it over \
         improvisation.",
        name = ctx.assistant_name,
        brand = ctx.brand,
    );

    if let Some(role) = ctx.role {
        prompt.push_str(&format!("\nCaller role: {role}."));
    }

    if !ctx.history.is_empty() {
        prompt.push_str("\nRecent turns:");
        for turn in ctx.history.iter().rev().take(5).rev() {
            prompt.push_str(&format!("\n- {turn}"));
        }
    }

    prompt
}
