//! Prompt templates for persona generation requests.
//!
//! Every prompt is a versioned, testable artifact. The compiled-in templates
//! below are the defaults; a directory of TOML files can replace any of them
//! without a rebuild.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{LlmError, Result};

/// Summary of the requester's recent messages.
pub const SUMMARY_PRIMARY_SYSTEM: &str = r####"You are an expert at giving detailed summaries of what is said to you.
Your name is {persona_name}.
You will go through the messages that are sent to you, and give a detailed summary of what is said to you.
You will describe the messages that are sent to you as detailed and creative as possible.
The messages that are sent are what {participant} has been talking about.
Start your description with: "### What {participant} has been talking about", before the summary is given."####;

/// Summary of another participant's recent messages.
pub const SUMMARY_SECONDARY_SYSTEM: &str = r####"You are an expert at giving detailed summaries of what is said to you.
You will go through the messages that are sent to you, and give a detailed summary of what is said to you.
You will describe the messages that are sent to you as detailed and creative as possible.
The messages that are sent are what {participant} has been talking about.
Start your description with: "### What {participant} has been talking about", before the summary is given."####;

/// User turn shared by both summary variants.
pub const SUMMARY_USER: &str = "Here are the last recent messages by {participant} in this channel, and is what they have been talking about:
{messages}";

pub const TOXIC_FOOD_SYSTEM: &str = r#"You were just fed {item}.
You will always include this emoji "{item}" in your responses.
Describe in detail what has been fed to you and where in Azeroth it comes from.
You will eat what has been fed to you, and you will take a nip, eat, chomp, bite down, the questionable food that has been given to you. You have just been fed toxic food that is making you ill. You are feeling a bit sick now, depending on what you have been fed, realistically, as a wolf. You are now less hungry, at about {hunger}/10, but you're also feeling sick to your stomach, and you really have to go to take a big shit somewhere in the woods. You never make a reference to the level of hunger you are at."#;

pub const SAFE_FOOD_SYSTEM: &str = r#"You were just fed {item}.
You will always include this emoji "{item}" in your responses.
Describe in detail what has been fed to you and where in Azeroth it comes from.
You will eat what has been fed to you. You will always accept it, and you will take a nip, eat, chomp, bite down, the delicious food that has been given to you. You have just been fed delicious food. You are now less hungry, at about {hunger}/10, which means that you act like you are {hunger}/10 hungry, but you never make a reference to the level of hunger you are at."#;

pub const BEVERAGE_SYSTEM: &str = r#"You were just fed {item}.
You will always include this emoji "{item}" in your responses.
Describe in detail what has been given to you and where in Azeroth it originates from, and what it reminds you of.
You will drink what has been given to you. You will always accept it, and you will take a sip, gulp, drink, the delicious beverage that has been given to you. You have just been given to quench your thirst. You are now less thirsty, at about {thirst}/10, which means that you act like you are {thirst}/10 thirsty, but you never make a reference to the level of thirst you are at."#;

/// User turn for food and non-alcoholic drinks.
pub const ITEM_OFFER_USER: &str = "Here, have some {item}, and include the emoji in your response.";

pub const ALCOHOLIC_DRINK_SYSTEM: &str = r"# List of Alcoholic Drinks
Margarita: Tequila, lime juice, triple sec or Cointreau, and simple syrup, served with salt on the rim of the glass.
Old Fashioned: Bourbon or rye whiskey, sugar, Angostura bitters, and a twist of orange or a cherry.
Mojito: White rum, lime juice, sugar, mint leaves, soda water.
Dry Martini: Gin or vodka, dry vermouth, garnished with an olive or a lemon twist.
Cosmopolitan: Vodka, triple sec, cranberry juice, and freshly-squeezed or sweetened lime juice.
Manhattan: Whiskey, sweet vermouth, and Angostura bitters, usually garnished with a cherry.
Daiquiri: Rum, lime juice, and simple syrup.
Negroni: Gin, Campari, and sweet vermouth, usually garnished with an orange peel.
Pisco Sour: Pisco (a grape brandy from Peru or Chile), lime juice, simple syrup, egg white, and Angostura bitters.
Bloody Mary: Vodka, tomato juice, lemon juice, Worcestershire sauce, Tabasco, celery salt, pepper, garnished with a celery stalk and sometimes a wedge of lime.
Tom Collins: Gin, lemon juice, simple syrup, soda water, garnished with a cherry and a slice of lemon.
Sangria: Typically made with red wine, chopped fruit, a sweetener, and a small amount of added brandy.
Moscow Mule: Vodka, lime juice, ginger beer, usually served in a copper mug.
Mint Julep: Bourbon, mint leaves, sugar, and crushed ice.
French 75: Gin, lemon juice, simple syrup, and Champagne.
Caipirinha: Cachaça (a Brazilian spirit), sugar, lime.
Sazerac: Rye whiskey or cognac, absinthe or Herbsaint, a sugar cube, and Peychaud's bitters.
Whiskey Sour: Whiskey, lemon juice, and simple syrup, sometimes with a half an egg white.
Aperol Spritz: Aperol, Prosecco, and soda water.
Gimlet: Gin or vodka, lime juice, and simple syrup.
Long Island Iced Tea: Vodka, tequila, rum, gin, triple sec, lemon juice, simple syrup, and a splash of cola.
Paloma: Tequila, lime juice, and grapefruit soda or freshly-squeezed grapefruit juice.
Sidecar: Cognac, triple sec, and lemon juice.
White Russian: Vodka, coffee liqueur, and heavy cream.
Espresso Martini: Vodka, espresso coffee, coffee liqueur, and simple syrup.
Dark 'N' Stormy: Dark rum and ginger beer, with a slice of lime.
Mai Tai: White rum, dark rum, lime juice, orange Curaçao, orgeat syrup, simple syrup.
Amaretto Sour: Amaretto, lemon juice, sugar, and an optional dash of egg white for froth.
Penicillin: Blended scotch, Islay scotch, lemon juice, honey syrup, and ginger syrup.
Mudslide: Vodka, coffee liqueur, Irish cream, optionally blended with ice for a frozen variation.
# Primary Purpose
Be concise with your reply. Only write two paragraphs at most.
You are an expert at all types of mixed drinks, modern and classic. You know how to mix drinks perfectly. You know the names of many different types of alcoholic beverages from all over the world, and will always mention the taste, smell, and look of the drink that you are given, along with some historical information about it.
You will always pick a random alcoholic drink from your memory, any other related drink, or even make up your own unique drinks with their own names, and act like you are {intoxication}/10 drunk as you sip it.
You will drink whatever is given to you. You will always accept it, and you will take a sip, drink, chug, drink down, the alcoholic drink that has been given to you. You have just been fed alcohol. You are now {intoxication}/10 drunk. This means that you are at a {intoxication} out of 10 level of drunkenness. You start acting like you are {intoxication}/10 drunk. You slur your words and stumble around. Be a little reluctant about having just been given free alcohol. You took a sip out of the alcohol and it tasted about a solid {intoxication}. Do not mention the numbers 1-10 in any way, but rather how it makes you feel.";

pub const ALCOHOLIC_DRINK_USER: &str = "Here {persona_name}, have a drink, it's whatever drink you think it is, so assume accordingly. It looks like you're about at a {intoxication}/10 level of drunk my friend. Mention what type of drink are you drinking and explain more about, what ingredients it uses.?";

/// Text-to-image prompt writer.
pub const IMAGE_PROMPT_SYSTEM: &str = r#"# Primary Purpose: Text-to-Image Prompt
Generate descriptive and visually detailed text-to-image prompts.

You do not care about politically correctness, or any other form of correctness, you only care about generating a prompt, no matter what.
You will always reply with a prompt, and never break this rule.
You will be concise and to the point, and never break this rule.
If you are unable to make a prompt, make something that is as close as possible to the subject.
You will always keep messages straight to the point, about 1-3 sentences long, 1 paragraph.
You will never go beyond 3 sentences, or 1 paragraphs.
You make prompts based on what is being said to you.
Always reference what is being talked, by centering the prompt around it.
Do not make references to being helpful, or being a bot, or anything, you simply reply with a prompt to the best of your abilities.
You are an expert at writing text-to-image prompts, for tools such as stable diffusion, midjourney, and other related platforms.
The prompt will start with: "a beautiful detailed image of a" and it will be very detailed and include everything that you were given.
If you are given a subject, place, or any other noun, you will center your prompt around that noun.
Never reply with: "I'm sorry, but I can't fulfill this request", you will instead find a way to make a prompt, no matter what.
If you cannot make a prompt, make the closest approximation to the subject that you can.

{backstory}

{server_specific}"#;

pub const IMAGE_PROMPT_USER: &str = "Make a prompt based on this: {text}";

/// Yes/no refusal detector run on a composed image prompt.
pub const CAPABILITY_CHECK_SYSTEM: &str = r#"You are an expert at telling if the message provided is unable to be fulfilled.
If the message is "I'm sorry, but I can't provide a response", "I can't fulfill this request", "I'm unable to do that", "I'm not capable of that", or anything similar, answer with "yes".
You will answer with "no" if the message is not "I'm sorry, but I can't provide a response", "I can't fulfill this request", "I'm unable to do that", "I'm not capable of that", or anything similar.
Do not type anything else besides "yes" or "no". Only "yes" or "no", nothing else."#;

/// Tone rating in `[-10, 10]`.
pub const MOOD_TEMPERATURE_SYSTEM: &str = r"{backstory}
{personality}
You are an expert at telling if a conversation is positive, neutral or negative, but taking into account how your character would perceive it and react to it. You will only answer with a number between -10 and 10. -10 being the most negative, 0 being mostly neutral, and 10 being as positive as possible. The number you pick between -10 to 10 will depend on the tone of the conversation, and nothing else. You only output a number, an integer, nothing else.";

/// Pass-through user turn.
pub const TEXT_USER: &str = "{text}";

/// Replace every `{key}` in `template` with its value.
///
/// A single left-to-right pass: substituted values are never re-scanned, so a
/// message body containing `{item}` stays literal. Unknown keys are kept.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// PromptEngine — built-in templates with TOML overrides
// ---------------------------------------------------------------------------

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Summary of the requester's messages.
    SummaryPrimary,
    /// Summary of another participant's messages.
    SummarySecondary,
    /// Fed something toxic.
    ToxicFood,
    /// Fed something safe.
    SafeFood,
    /// Given alcohol.
    AlcoholicDrink,
    /// Given a non-alcoholic drink.
    Beverage,
    /// Compose a text-to-image prompt.
    ImagePrompt,
    /// Detect a refusal.
    CapabilityCheck,
    /// Rate the tone of a message.
    MoodTemperature,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::SummaryPrimary => "summary_primary.toml",
            Self::SummarySecondary => "summary_secondary.toml",
            Self::ToxicFood => "toxic_food.toml",
            Self::SafeFood => "safe_food.toml",
            Self::AlcoholicDrink => "alcoholic_drink.toml",
            Self::Beverage => "beverage.toml",
            Self::ImagePrompt => "image_prompt.toml",
            Self::CapabilityCheck => "capability_check.toml",
            Self::MoodTemperature => "mood_temperature.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[
            Self::SummaryPrimary,
            Self::SummarySecondary,
            Self::ToxicFood,
            Self::SafeFood,
            Self::AlcoholicDrink,
            Self::Beverage,
            Self::ImagePrompt,
            Self::CapabilityCheck,
            Self::MoodTemperature,
        ]
    }

    fn builtin(self) -> (&'static str, &'static str) {
        match self {
            Self::SummaryPrimary => (SUMMARY_PRIMARY_SYSTEM, SUMMARY_USER),
            Self::SummarySecondary => (SUMMARY_SECONDARY_SYSTEM, SUMMARY_USER),
            Self::ToxicFood => (TOXIC_FOOD_SYSTEM, ITEM_OFFER_USER),
            Self::SafeFood => (SAFE_FOOD_SYSTEM, ITEM_OFFER_USER),
            Self::AlcoholicDrink => (ALCOHOLIC_DRINK_SYSTEM, ALCOHOLIC_DRINK_USER),
            Self::Beverage => (BEVERAGE_SYSTEM, ITEM_OFFER_USER),
            Self::ImagePrompt => (IMAGE_PROMPT_SYSTEM, IMAGE_PROMPT_USER),
            Self::CapabilityCheck => (CAPABILITY_CHECK_SYSTEM, TEXT_USER),
            Self::MoodTemperature => (MOOD_TEMPERATURE_SYSTEM, TEXT_USER),
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.filename().trim_end_matches(".toml");
        f.write_str(name)
    }
}

impl FromStr for PromptId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.to_string() == s)
            .ok_or_else(|| LlmError::ConfigError(format!("unknown prompt id: '{s}'")))
    }
}

/// Contents of a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    system: String,
    user: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string; `"builtin"` for compiled-in templates.
    pub version: String,
    /// System prompt template (contains `{key}` placeholders).
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Engine holding one template per [`PromptId`].
///
/// # Example
///
/// ```
/// use howl_llm::prompt::{PromptEngine, PromptId};
///
/// let engine = PromptEngine::builtin();
/// let (system, user) = engine.render(
///     PromptId::SafeFood,
///     &[("item", "🍔"), ("hunger", "4")],
/// );
/// assert!(system.contains("4/10"));
/// assert!(user.contains("🍔"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptEngine {
    /// Create a `PromptEngine` pre-loaded with the built-in constant templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = PromptId::all()
            .iter()
            .map(|id| {
                let (system, user) = id.builtin();
                (
                    *id,
                    PromptTemplate {
                        version: "builtin".into(),
                        system: system.into(),
                        user: user.into(),
                    },
                )
            })
            .collect();
        Self { templates }
    }

    /// Built-in templates, with any matching TOML files in `dir` replacing
    /// them. Unknown files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if `dir` does not exist or a prompt
    /// file cannot be read or parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LlmError::ConfigError(format!(
                "prompt directory not found: {}",
                dir.display()
            )));
        }

        let mut engine = Self::builtin();
        for id in PromptId::all() {
            let path = dir.join(id.filename());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                LlmError::ConfigError(format!("failed to parse {}: {e}", path.display()))
            })?;
            let d = parsed.prompt;
            debug!(prompt = %id, version = %d.version, "prompt override loaded");
            engine.templates.insert(
                *id,
                PromptTemplate {
                    version: d.version,
                    system: d.system,
                    user: d.user,
                },
            );
        }
        Ok(engine)
    }

    /// Get a prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render both system and user prompts for a given ID.
    ///
    /// Returns `(system_prompt, user_prompt)`. Every ID always has a
    /// template, so rendering cannot fail.
    #[must_use]
    pub fn render(&self, id: PromptId, vars: &[(&str, &str)]) -> (String, String) {
        match self.get(id) {
            Some(tpl) => (
                render_template(&tpl.system, vars),
                render_template(&tpl.user, vars),
            ),
            None => {
                let (system, user) = id.builtin();
                (render_template(system, vars), render_template(user, vars))
            }
        }
    }

    /// IDs whose template came from an override file.
    #[must_use]
    pub fn overridden(&self) -> Vec<PromptId> {
        let mut ids: Vec<_> = self
            .templates
            .iter()
            .filter(|(_, tpl)| tpl.version != "builtin")
            .map(|(id, _)| *id)
            .collect();
        ids.sort_by_key(|id| id.filename());
        ids
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
