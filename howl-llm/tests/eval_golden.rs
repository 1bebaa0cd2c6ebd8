//! Prompt Quality Evaluation — Golden Test Set.
//!
//! A curated set of template + variables → expected-content cases that pin
//! down the wording the persona depends on: item emojis reach the model, need
//! levels are stated on the 10-point scale, and summaries are asked to open
//! with the fixed heading.
//!
//! Run with `cargo test -p howl-llm --test eval_golden`.

use howl_llm::prompt::{self, PromptEngine, PromptId};

/// A golden test case for prompt evaluation.
struct GoldenCase {
    /// Human-readable name for the test case.
    name: &'static str,
    /// Which prompt template constant to use (system or user).
    template: &'static str,
    /// Template variables to fill in.
    vars: Vec<(&'static str, &'static str)>,
    /// Strings that MUST appear in the rendered prompt.
    prompt_must_contain: Vec<&'static str>,
    /// Strings that MUST NOT appear in the rendered prompt.
    prompt_must_not_contain: Vec<&'static str>,
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        // ---------------------------------------------------------------
        // 1. Summaries
        // ---------------------------------------------------------------
        GoldenCase {
            name: "primary_summary_system",
            template: prompt::SUMMARY_PRIMARY_SYSTEM,
            vars: vec![("persona_name", "Lupos"), ("participant", "Alice")],
            prompt_must_contain: vec![
                "Your name is Lupos.",
                "what Alice has been talking about",
                "\"### What Alice has been talking about\"",
                "before the summary is given.",
            ],
            prompt_must_not_contain: vec!["{participant}", "{persona_name}"],
        },
        GoldenCase {
            name: "secondary_summary_system",
            template: prompt::SUMMARY_SECONDARY_SYSTEM,
            vars: vec![("participant", "Bob")],
            prompt_must_contain: vec![
                "Start your description with: \"### What Bob has been talking about\"",
                "before the summary is given.",
            ],
            prompt_must_not_contain: vec!["Your name is", "{participant}"],
        },
        GoldenCase {
            name: "summary_user",
            template: prompt::SUMMARY_USER,
            vars: vec![
                ("participant", "Bob"),
                ("messages", "first message\n\nsecond message"),
            ],
            prompt_must_contain: vec![
                "last recent messages by Bob",
                "first message\n\nsecond message",
            ],
            prompt_must_not_contain: vec!["{messages}"],
        },
        // ---------------------------------------------------------------
        // 2. Food
        // ---------------------------------------------------------------
        GoldenCase {
            name: "toxic_food_system",
            template: prompt::TOXIC_FOOD_SYSTEM,
            vars: vec![("item", "🍫"), ("hunger", "4")],
            prompt_must_contain: vec![
                "You were just fed 🍫.",
                "include this emoji \"🍫\"",
                "Azeroth",
                "about 4/10",
                "sick",
            ],
            prompt_must_not_contain: vec!["{item}", "{hunger}", "delicious food that"],
        },
        GoldenCase {
            name: "safe_food_system",
            template: prompt::SAFE_FOOD_SYSTEM,
            vars: vec![("item", "🍔"), ("hunger", "3")],
            prompt_must_contain: vec!["You were just fed 🍔.", "3/10 hungry", "Azeroth"],
            prompt_must_not_contain: vec!["toxic", "{hunger}"],
        },
        GoldenCase {
            name: "item_offer_user",
            template: prompt::ITEM_OFFER_USER,
            vars: vec![("item", "🍔")],
            prompt_must_contain: vec!["Here, have some 🍔, and include the emoji in your response."],
            prompt_must_not_contain: vec!["{item}"],
        },
        // ---------------------------------------------------------------
        // 3. Drinks
        // ---------------------------------------------------------------
        GoldenCase {
            name: "beverage_system",
            template: prompt::BEVERAGE_SYSTEM,
            vars: vec![("item", "🥛"), ("thirst", "2")],
            prompt_must_contain: vec!["You were just fed 🥛.", "2/10 thirsty", "originates"],
            prompt_must_not_contain: vec!["drunk", "{thirst}"],
        },
        GoldenCase {
            name: "alcoholic_system",
            template: prompt::ALCOHOLIC_DRINK_SYSTEM,
            vars: vec![("intoxication", "7")],
            prompt_must_contain: vec![
                "# List of Alcoholic Drinks",
                "Negroni",
                "7/10 drunk",
                "Do not mention the numbers 1-10 in any way",
            ],
            prompt_must_not_contain: vec!["{intoxication}"],
        },
        GoldenCase {
            name: "alcoholic_user",
            template: prompt::ALCOHOLIC_DRINK_USER,
            vars: vec![("persona_name", "Lupos"), ("intoxication", "7")],
            prompt_must_contain: vec!["Here Lupos, have a drink", "7/10 level of drunk"],
            prompt_must_not_contain: vec!["{persona_name}"],
        },
        // ---------------------------------------------------------------
        // 4. Media helpers
        // ---------------------------------------------------------------
        GoldenCase {
            name: "image_prompt_system",
            template: prompt::IMAGE_PROMPT_SYSTEM,
            vars: vec![
                ("backstory", "You grew up in Elwynn Forest."),
                ("server_specific", "Keep it family friendly."),
            ],
            prompt_must_contain: vec![
                "a beautiful detailed image of a",
                "Elwynn Forest",
                "family friendly",
            ],
            prompt_must_not_contain: vec!["{backstory}", "{server_specific}"],
        },
        GoldenCase {
            name: "image_prompt_user",
            template: prompt::IMAGE_PROMPT_USER,
            vars: vec![("text", "a wolf howling at two moons")],
            prompt_must_contain: vec!["Make a prompt based on this: a wolf howling at two moons"],
            prompt_must_not_contain: vec!["{text}"],
        },
        GoldenCase {
            name: "mood_temperature_system",
            template: prompt::MOOD_TEMPERATURE_SYSTEM,
            vars: vec![("backstory", "Backstory."), ("personality", "Grumpy.")],
            prompt_must_contain: vec!["Backstory.\nGrumpy.", "-10", "integer"],
            prompt_must_not_contain: vec!["{personality}"],
        },
    ]
}

// ---------------------------------------------------------------------------
// Offline Tests — Template Rendering Validation
// ---------------------------------------------------------------------------

#[test]
fn golden_prompts_render_without_unresolved_vars() {
    for case in &golden_cases() {
        let rendered = prompt::render_template(case.template, &case.vars);

        for needle in &case.prompt_must_contain {
            assert!(
                rendered.contains(needle),
                "Golden case '{}': rendered prompt must contain '{}' but doesn't.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }

        for needle in &case.prompt_must_not_contain {
            assert!(
                !rendered.contains(needle),
                "Golden case '{}': rendered prompt must NOT contain '{}' but does.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }
    }
}

#[test]
fn golden_set_has_minimum_coverage() {
    let cases = golden_cases();
    assert!(
        cases.len() >= 10,
        "Golden set must have at least 10 test cases, got {}",
        cases.len()
    );
}

#[test]
fn every_builtin_renders_fully_with_its_variables() {
    let vars = [
        ("persona_name", "Lupos"),
        ("participant", "Alice"),
        ("messages", "hello"),
        ("item", "🍔"),
        ("hunger", "4"),
        ("thirst", "4"),
        ("intoxication", "6"),
        ("backstory", "b"),
        ("server_specific", "s"),
        ("personality", "p"),
        ("text", "t"),
    ];
    let engine = PromptEngine::builtin();
    for id in PromptId::all() {
        let (system, user) = engine.render(*id, &vars);
        for (key, _) in &vars {
            let placeholder = format!("{{{key}}}");
            assert!(!system.contains(&placeholder), "{id} system leaves {placeholder}");
            assert!(!user.contains(&placeholder), "{id} user leaves {placeholder}");
        }
        assert!(!system.trim().is_empty(), "{id} has an empty system prompt");
    }
}

#[test]
fn offer_prompts_always_carry_the_item() {
    let engine = PromptEngine::builtin();
    for id in [PromptId::ToxicFood, PromptId::SafeFood, PromptId::Beverage] {
        let (system, user) = engine.render(id, &[("item", "🧋"), ("hunger", "1"), ("thirst", "1")]);
        assert!(system.contains("🧋"), "{id} system lost the item");
        assert!(user.contains("🧋"), "{id} user lost the item");
    }
}

#[test]
fn capability_check_demands_yes_or_no() {
    assert!(prompt::CAPABILITY_CHECK_SYSTEM.contains("\"yes\""));
    assert!(prompt::CAPABILITY_CHECK_SYSTEM.contains("\"no\""));
    assert_eq!(prompt::render_template(prompt::TEXT_USER, &[("text", "x")]), "x");
}

#[test]
fn summary_prompts_end_with_the_heading_instruction() {
    for template in [prompt::SUMMARY_PRIMARY_SYSTEM, prompt::SUMMARY_SECONDARY_SYSTEM] {
        let rendered = prompt::render_template(template, &[("persona_name", "Lupos"), ("participant", "Dan")]);
        assert!(
            rendered.ends_with(
                "Start your description with: \"### What Dan has been talking about\", before the summary is given."
            ),
            "summary prompt lost its closing instruction:\n{rendered}"
        );
    }
}
