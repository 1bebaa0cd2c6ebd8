//! Action resolver — eat, drink and alcohol stimuli.
//!
//! Every action follows the same path: pick an outcome (drawing an item from
//! a catalog where the action calls for one), apply the outcome's mutations
//! from the [`ActionTable`], then ask the backend for an in-character reply
//! through an isolated two-entry conversation.
//!
//! Mutations are committed before generation and stay committed when
//! generation fails.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use howl_core::catalog::Catalogs;
use howl_core::{Conversation, HowlConfig, HowlError, Need, NeedStore, RequesterContext};
use howl_llm::{Generation, PromptEngine, PromptId};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::sections;

// ---------------------------------------------------------------------------
// Actions and outcomes
// ---------------------------------------------------------------------------

/// A stimulus a requester can apply to the persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Feed a random food item.
    Eat,
    /// Give a random drink.
    Drink,
    /// Give an alcoholic drink, no draw.
    Alcohol,
}

impl ActionKind {
    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eat => "eat",
            Self::Drink => "drink",
            Self::Alcohol => "alcohol",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = HowlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eat" | "feed" => Ok(Self::Eat),
            "drink" | "give-drink" => Ok(Self::Drink),
            "alcohol" | "give-alcohol" => Ok(Self::Alcohol),
            other => Err(HowlError::UnknownAction(other.to_string())),
        }
    }
}

/// What an action turned out to be once the item is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Food from the toxic set.
    ToxicFood,
    /// Any other food.
    SafeFood,
    /// A drink from the alcoholic set, or the alcohol action.
    AlcoholicDrink,
    /// Any other drink.
    Beverage,
}

impl Outcome {
    /// Template used for the reply.
    #[must_use]
    pub fn prompt_id(self) -> PromptId {
        match self {
            Self::ToxicFood => PromptId::ToxicFood,
            Self::SafeFood => PromptId::SafeFood,
            Self::AlcoholicDrink => PromptId::AlcoholicDrink,
            Self::Beverage => PromptId::Beverage,
        }
    }

    /// The counter whose level the reply is told about.
    #[must_use]
    pub fn level_need(self) -> Need {
        match self {
            Self::ToxicFood | Self::SafeFood => Need::Hunger,
            Self::AlcoholicDrink => Need::Intoxication,
            Self::Beverage => Need::Thirst,
        }
    }

    /// Classify `item` for `action`. The alcohol action ignores the item.
    #[must_use]
    pub fn classify(action: ActionKind, item: &str, catalogs: &Catalogs) -> Self {
        match action {
            ActionKind::Eat if catalogs.is_toxic(item) => Self::ToxicFood,
            ActionKind::Eat => Self::SafeFood,
            ActionKind::Drink if catalogs.is_alcoholic(item) => Self::AlcoholicDrink,
            ActionKind::Drink => Self::Beverage,
            ActionKind::Alcohol => Self::AlcoholicDrink,
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation table
// ---------------------------------------------------------------------------

/// One signed counter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Counter to change.
    pub need: Need,
    /// Signed amount; the store clamps.
    pub delta: i64,
}

impl Mutation {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(need: Need, delta: i64) -> Self {
        Self { need, delta }
    }
}

/// Mutations applied per outcome, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
    /// Applied after toxic food.
    pub toxic_food: Vec<Mutation>,
    /// Applied after safe food.
    pub safe_food: Vec<Mutation>,
    /// Applied after an alcoholic drink.
    pub alcoholic_drink: Vec<Mutation>,
    /// Applied after any other drink.
    pub beverage: Vec<Mutation>,
}

impl ActionTable {
    /// Mutations for `outcome`.
    #[must_use]
    pub fn mutations(&self, outcome: Outcome) -> &[Mutation] {
        match outcome {
            Outcome::ToxicFood => &self.toxic_food,
            Outcome::SafeFood => &self.safe_food,
            Outcome::AlcoholicDrink => &self.alcoholic_drink,
            Outcome::Beverage => &self.beverage,
        }
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            toxic_food: vec![
                Mutation::new(Need::Hunger, -1),
                Mutation::new(Need::Bathroom, 4),
                Mutation::new(Need::Mood, -2),
                Mutation::new(Need::Sickness, 1),
            ],
            safe_food: vec![
                Mutation::new(Need::Hunger, -1),
                Mutation::new(Need::Bathroom, 1),
                Mutation::new(Need::Mood, 1),
            ],
            alcoholic_drink: vec![
                Mutation::new(Need::Mood, 1),
                Mutation::new(Need::Intoxication, 1),
            ],
            beverage: vec![
                Mutation::new(Need::Thirst, -1),
                Mutation::new(Need::Bathroom, 1),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Result of a resolved action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReply {
    /// The action requested.
    pub action: ActionKind,
    /// What it turned into.
    pub outcome: Outcome,
    /// The item given, if one was drawn or forced.
    pub item: Option<String>,
    /// Post-mutation level of the outcome's counter.
    pub level: u8,
    /// The persona's reply.
    pub reply: String,
}

/// Resolves actions against a shared [`NeedStore`].
pub struct ActionResolver {
    needs: NeedStore,
    catalogs: Arc<Catalogs>,
    table: ActionTable,
    generation: Arc<dyn Generation>,
    prompts: Arc<PromptEngine>,
    config: Arc<HowlConfig>,
    rng: Mutex<StdRng>,
}

impl ActionResolver {
    /// Create a resolver with the default table and an entropy-seeded rng.
    #[must_use]
    pub fn new(
        needs: NeedStore,
        catalogs: Arc<Catalogs>,
        generation: Arc<dyn Generation>,
        prompts: Arc<PromptEngine>,
        config: Arc<HowlConfig>,
    ) -> Self {
        Self {
            needs,
            catalogs,
            table: ActionTable::default(),
            generation,
            prompts,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Make draws reproducible.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Replace the mutation table.
    #[must_use]
    pub fn with_table(self, table: ActionTable) -> Self {
        Self { table, ..self }
    }

    /// The counters this resolver mutates.
    #[must_use]
    pub fn needs(&self) -> &NeedStore {
        &self.needs
    }

    /// Draw an item for `action` and classify it. The alcohol action draws
    /// nothing.
    pub fn draw(&self, action: ActionKind) -> (Outcome, Option<String>) {
        let mut rng = self.rng.lock();
        let item = match action {
            ActionKind::Eat => self.catalogs.food.draw(&mut *rng),
            ActionKind::Drink => self.catalogs.drink.draw(&mut *rng),
            ActionKind::Alcohol => return (Outcome::AlcoholicDrink, None),
        };
        (
            Outcome::classify(action, item, &self.catalogs),
            Some(item.to_string()),
        )
    }

    /// Apply the table's mutations for `outcome`; returns the post-mutation
    /// level of the outcome's counter.
    pub fn apply(&self, outcome: Outcome) -> u8 {
        let level_need = outcome.level_need();
        let mut level = None;
        for mutation in self.table.mutations(outcome) {
            let after = self.needs.apply(mutation.need, mutation.delta);
            if mutation.need == level_need {
                level = Some(after);
            }
        }
        level.unwrap_or_else(|| self.needs.get(level_need))
    }

    /// Resolve `action` with a random draw.
    ///
    /// # Errors
    /// Generation failures propagate. Mutations stay applied.
    pub async fn resolve(&self, action: ActionKind, ctx: &RequesterContext) -> Result<ActionReply> {
        self.resolve_with_item(action, None, ctx).await
    }

    /// Resolve `action`, using `item` instead of a draw when given.
    ///
    /// # Errors
    /// Generation failures propagate. Mutations stay applied.
    pub async fn resolve_with_item(
        &self,
        action: ActionKind,
        item: Option<&str>,
        ctx: &RequesterContext,
    ) -> Result<ActionReply> {
        let (outcome, item) = match (action, item) {
            (ActionKind::Alcohol, _) => (Outcome::AlcoholicDrink, None),
            (_, Some(forced)) => (
                Outcome::classify(action, forced, &self.catalogs),
                Some(forced.to_string()),
            ),
            (_, None) => self.draw(action),
        };
        let level = self.apply(outcome);
        debug!(%action, ?outcome, item = item.as_deref(), level, "action applied");

        let conversation = self.conversation(outcome, item.as_deref(), level, ctx);
        let reply = self
            .generation
            .generate(&conversation, self.config.context.action_max_tokens, None)
            .await?;
        info!(
            %action,
            ?outcome,
            requester = %ctx.requester.id,
            needs = %self.needs.snapshot(),
            "action resolved"
        );
        Ok(ActionReply {
            action,
            outcome,
            item,
            level,
            reply,
        })
    }

    /// The isolated exchange that asks for the persona's reaction.
    #[must_use]
    pub fn conversation(
        &self,
        outcome: Outcome,
        item: Option<&str>,
        level: u8,
        ctx: &RequesterContext,
    ) -> Conversation {
        let level = level.to_string();
        let level_key = outcome.level_need().as_str();
        let vars = [
            ("item", item.unwrap_or_default()),
            (level_key, level.as_str()),
            ("persona_name", ctx.persona.display_name.as_str()),
        ];
        let (instruction, user) = self.prompts.render(outcome.prompt_id(), &vars);
        let system = sections::isolated_system(&self.config, ctx, Utc::now(), &instruction);
        Conversation::isolated(system, user, ctx.requester.api_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use howl_core::needs::NeedSnapshot;
    use howl_core::{ChannelInfo, Participant, PersonaIdentity, Role};
    use howl_llm::mock::ScriptedGeneration;

    fn ctx() -> RequesterContext {
        RequesterContext {
            requester: Participant {
                id: "42".into(),
                username: "alice smith".into(),
                display_name: None,
                roles: Vec::new(),
            },
            persona: PersonaIdentity {
                id: "7".into(),
                display_name: "Lupos".into(),
                roles: Vec::new(),
            },
            channel: ChannelInfo {
                id: "dm".into(),
                name: "dm".into(),
                topic: None,
            },
            server: None,
            content: String::new(),
        }
    }

    fn resolver(backend: &ScriptedGeneration) -> ActionResolver {
        ActionResolver::new(
            NeedStore::new(NeedSnapshot::uniform(5)),
            Arc::new(Catalogs::default()),
            Arc::new(backend.clone()),
            Arc::new(PromptEngine::builtin()),
            Arc::new(HowlConfig::default()),
        )
        .with_seed(7)
    }

    #[test]
    fn action_names_parse() {
        assert_eq!("feed".parse::<ActionKind>().expect("eat"), ActionKind::Eat);
        assert_eq!(" Drink ".parse::<ActionKind>().expect("drink"), ActionKind::Drink);
        assert_eq!("give-alcohol".parse::<ActionKind>().expect("alcohol"), ActionKind::Alcohol);
        assert!(matches!(
            "pet".parse::<ActionKind>(),
            Err(HowlError::UnknownAction(name)) if name == "pet"
        ));
    }

    #[tokio::test]
    async fn three_toxic_meals_clamp_bathroom() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        for _ in 0..3 {
            let reply = resolver
                .resolve_with_item(ActionKind::Eat, Some("🍫"), &ctx())
                .await
                .expect("resolve");
            assert_eq!(reply.outcome, Outcome::ToxicFood);
        }
        let needs = resolver.needs().snapshot();
        assert_eq!(needs.hunger, 2);
        assert_eq!(needs.bathroom, 10);
        assert_eq!(needs.sickness, 8);
        assert_eq!(needs.mood, 0);
    }

    #[tokio::test]
    async fn beverage_moves_thirst_only_by_one() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        let reply = resolver
            .resolve_with_item(ActionKind::Drink, Some("🥛"), &ctx())
            .await
            .expect("resolve");
        assert_eq!(reply.outcome, Outcome::Beverage);
        assert_eq!(reply.level, 4);
        let needs = resolver.needs().snapshot();
        assert_eq!(needs.thirst, 4);
        assert_eq!(needs.intoxication, 5);
    }

    #[tokio::test]
    async fn alcohol_never_touches_thirst() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        resolver.resolve(ActionKind::Alcohol, &ctx()).await.expect("alcohol");
        resolver
            .resolve_with_item(ActionKind::Drink, Some("🍺"), &ctx())
            .await
            .expect("beer");
        let needs = resolver.needs().snapshot();
        assert_eq!(needs.thirst, 5);
        assert_eq!(needs.intoxication, 7);
        assert_eq!(needs.mood, 7);
    }

    #[tokio::test]
    async fn random_safe_meals_never_raise_sickness() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        for _ in 0..40 {
            let before = resolver.needs().get(Need::Sickness);
            let reply = resolver.resolve(ActionKind::Eat, &ctx()).await.expect("eat");
            let after = resolver.needs().get(Need::Sickness);
            match reply.outcome {
                Outcome::SafeFood => assert_eq!(before, after),
                Outcome::ToxicFood => assert!(after >= before),
                other => panic!("eat produced {other:?}"),
            }
            resolver.needs().reset();
        }
    }

    #[tokio::test]
    async fn failed_generation_keeps_mutations() {
        let backend = ScriptedGeneration::new();
        backend.push_failure("backend down");
        let resolver = resolver(&backend);
        let result = resolver
            .resolve_with_item(ActionKind::Eat, Some("🍔"), &ctx())
            .await;
        assert!(result.is_err());
        assert_eq!(resolver.needs().get(Need::Hunger), 4);
        assert_eq!(resolver.needs().get(Need::Bathroom), 6);
    }

    #[tokio::test]
    async fn request_is_isolated_and_carries_the_item() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        resolver
            .resolve_with_item(ActionKind::Eat, Some("🍔"), &ctx())
            .await
            .expect("eat");
        let call = &backend.calls()[0];
        assert_eq!(call.max_tokens, HowlConfig::default().context.action_max_tokens);
        assert!(call.model.is_none());
        let messages = call.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("You were just fed 🍔."));
        assert!(messages[0].content.contains("4/10"));
        assert!(messages[0].content.contains("# Date and Time"));
        assert!(!messages[0].content.contains("# Backstory"));
        assert_eq!(messages[1].name.as_deref(), Some("alice_smith"));
        assert!(messages[1].content.contains("🍔"));
    }

    #[test]
    fn draws_follow_catalog_membership() {
        let backend = ScriptedGeneration::new();
        let resolver = resolver(&backend);
        let catalogs = Catalogs::default();
        for _ in 0..100 {
            let (outcome, item) = resolver.draw(ActionKind::Drink);
            let item = item.expect("drink draws an item");
            assert_eq!(outcome == Outcome::AlcoholicDrink, catalogs.is_alcoholic(&item));
        }
        assert_eq!(resolver.draw(ActionKind::Alcohol), (Outcome::AlcoholicDrink, None));
    }
}
