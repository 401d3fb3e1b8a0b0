//! Encounter session: owned state, derived caches, and the query/command API.
//!
//! [`Encounter`] wraps the pure core behind a stateful host surface. It owns
//! the [`EncounterState`], keeps the blocking sets and light field cached
//! (both derive purely from the board, so they only rebuild on board edits),
//! and funnels every gameplay mutation through [`Encounter::resolve_with`].

use tactics_core::{
    ActionDefinition, ActionEvent, ActionResolution, AdvantageState, BoardBlocking, Cell,
    DoorState, EconomyFlags, Edge, EffectHooks, EncounterState, NoHooks, OutcomeKind, PathContext,
    PathOptions, PcgRng, Rejection, ResolveContext, TargetIntent, Team, Token, TokenId, TurnPhase,
    VisibilityMap, VisionContext, WallSegment, compute_seed, find_path, is_cell_visible,
    light_levels, resolve_action, visibility_map,
};

use crate::error::{Result, RuntimeError};
use crate::registry::ActionRegistry;

// ============================================================================
// Command outcome
// ============================================================================

/// What a resolved command hands back to the host.
///
/// The new snapshot is committed into the session before this is returned,
/// so the report carries only the outcome and the event log.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolutionReport {
    Resolved {
        outcome: OutcomeKind,
        events: Vec<ActionEvent>,
    },
    Rejected(Rejection),
}

impl ResolutionReport {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Resolved { .. } => None,
        }
    }

    pub fn outcome(&self) -> Option<OutcomeKind> {
        match self {
            Self::Resolved { outcome, .. } => Some(*outcome),
            Self::Rejected(_) => None,
        }
    }

    pub fn events(&self) -> &[ActionEvent] {
        match self {
            Self::Resolved { events, .. } => events,
            Self::Rejected(_) => &[],
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// A live encounter: state, caches, registered actions, and the rng stream.
pub struct Encounter {
    state: EncounterState,
    actions: ActionRegistry,
    blocking: BoardBlocking,
    light: Vec<f32>,
    rng: PcgRng,
    base_seed: u64,
    /// Count of committed resolutions; folded into every base seed so each
    /// accepted command draws from a fresh stream.
    resolutions: u32,
}

impl Encounter {
    pub fn new(state: EncounterState) -> Self {
        Self::with_seed(state, 0)
    }

    pub fn with_seed(state: EncounterState, base_seed: u64) -> Self {
        let blocking = BoardBlocking::build(&state.board);
        let light = light_levels(&state.board, &blocking);
        Self {
            state,
            actions: ActionRegistry::new(),
            blocking,
            light,
            rng: PcgRng,
            base_seed,
            resolutions: 0,
        }
    }

    /// Rebuilds the board-derived caches. Called after every board edit.
    fn refresh_caches(&mut self) {
        self.blocking = BoardBlocking::build(&self.state.board);
        self.light = light_levels(&self.state.board, &self.blocking);
    }

    // ===== setup =====

    pub fn register_action(&mut self, def: ActionDefinition) {
        tracing::debug!(action = %def.id, "registering action");
        self.actions.register(def);
    }

    pub fn action(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.get(id)
    }

    /// Places a token; ids are assigned by the arena, not the caller.
    pub fn add_token(&mut self, token: Token) -> TokenId {
        self.state.tokens.insert(token)
    }

    // ===== queries =====

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn token(&self, id: TokenId) -> Result<&Token> {
        self.state
            .tokens
            .get(id)
            .ok_or(RuntimeError::TokenNotFound(id))
    }

    pub fn blocking(&self) -> &BoardBlocking {
        &self.blocking
    }

    /// Cached per-cell light levels, row-major over the board.
    pub fn light_levels(&self) -> &[f32] {
        &self.light
    }

    /// Full visibility map from a token's position, profile, and facing.
    pub fn visibility_for(&self, observer: TokenId) -> Result<VisibilityMap> {
        let token = self.token(observer)?;
        let ctx = self.vision_context();
        Ok(visibility_map(
            token.position,
            &token.vision,
            token.facing_deg,
            &ctx,
        ))
    }

    pub fn is_cell_visible(&self, observer: TokenId, cell: Cell) -> Result<bool> {
        let token = self.token(observer)?;
        let ctx = self.vision_context();
        Ok(is_cell_visible(
            token.position,
            cell,
            &token.vision,
            token.facing_deg,
            &ctx,
        ))
    }

    pub fn is_target_visible(&self, observer: TokenId, target: TokenId) -> Result<bool> {
        let cell = self.token(target)?.position;
        self.is_cell_visible(observer, cell)
    }

    /// Walkable path from the actor toward `target`, budgeted by its
    /// movement profile. Other live tokens block passage.
    pub fn path_to(&self, actor: TokenId, target: Cell, options: &PathOptions) -> Result<Vec<Cell>> {
        let token = self.token(actor)?;
        let occupied = self.state.tokens.occupied_cells(Some(actor));
        let ctx = PathContext {
            board: &self.state.board,
            blocking: &self.blocking,
            occupied: &occupied,
        };
        Ok(find_path(
            token.position,
            target,
            &token.movement_profile(),
            options,
            &ctx,
        ))
    }

    fn vision_context(&self) -> VisionContext<'_> {
        VisionContext {
            dims: self.state.board.dims,
            topology: self.state.board.topology,
            blocking: &self.blocking,
            light: Some(&self.light),
        }
    }

    // ===== board edits =====

    /// Toggles the door on `edge` and rebuilds the caches.
    pub fn set_door_state(&mut self, edge: Edge, door: DoorState) -> Result<()> {
        if !self.state.board.set_door_state(edge, door) {
            return Err(RuntimeError::NoDoorAt(edge));
        }
        tracing::debug!(?edge, ?door, "door toggled");
        self.refresh_caches();
        Ok(())
    }

    pub fn add_wall(&mut self, segment: WallSegment) {
        self.state.board.walls.push(segment);
        self.refresh_caches();
    }

    /// Damages the first live obstacle whose footprint covers `cell`.
    /// Returns its remaining hp; destroyed obstacles free their cells.
    pub fn damage_obstacle(&mut self, cell: Cell, amount: u32) -> Result<u32> {
        let board = &mut self.state.board;
        let mut remaining = None;
        for obstacle in board.obstacles.iter_mut().filter(|o| o.is_alive()) {
            let covers = board
                .obstacle_types
                .get(&obstacle.type_id)
                .is_some_and(|ty| obstacle.cells(ty).contains(&cell));
            if covers {
                obstacle.hp = obstacle.hp.saturating_sub(amount);
                remaining = Some(obstacle.hp);
                break;
            }
        }
        let remaining = remaining.ok_or(RuntimeError::NoObstacleAt(cell))?;
        tracing::debug!(?cell, amount, remaining, "obstacle damaged");
        self.refresh_caches();
        Ok(remaining)
    }

    // ===== turn bookkeeping =====

    /// Opens a turn phase: sets the phase and resets the action economy of
    /// every token acting in it.
    pub fn begin_phase(&mut self, phase: TurnPhase) {
        self.state.phase = phase;
        for id in self.state.tokens.iter().map(|t| t.id).collect::<Vec<_>>() {
            let Some(token) = self.state.tokens.get_mut(id) else {
                continue;
            };
            let acts_now = match phase {
                TurnPhase::Player => token.team == Team::Player,
                TurnPhase::Enemy => token.team != Team::Player,
            };
            if acts_now {
                token.flags = EconomyFlags::empty();
                for counter in token.usage.values_mut() {
                    counter.this_turn = 0;
                }
            }
        }
        tracing::debug!(?phase, round = self.state.round, "phase started");
    }

    /// Closes the round: ticks status durations down and drops expired ones.
    pub fn end_round(&mut self) {
        for id in self.state.tokens.iter().map(|t| t.id).collect::<Vec<_>>() {
            let Some(token) = self.state.tokens.get_mut(id) else {
                continue;
            };
            for status in token.statuses.iter_mut() {
                status.remaining_rounds = status.remaining_rounds.saturating_sub(1);
            }
            token.statuses.retain(|s| s.remaining_rounds > 0);
        }
        self.state.round += 1;
        tracing::debug!(round = self.state.round, "round advanced");
    }

    // ===== commands =====

    /// Resolves a registered action with no hooks and neutral advantage.
    pub fn resolve(
        &mut self,
        action_id: &str,
        actor: TokenId,
        intent: TargetIntent,
    ) -> Result<ResolutionReport> {
        self.resolve_with(action_id, actor, intent, &NoHooks, AdvantageState::Normal)
    }

    /// Resolves a registered action against the current snapshot.
    ///
    /// On acceptance the returned snapshot is committed and the seed stream
    /// advances; a rejection leaves the session byte-identical, so retrying
    /// the same command yields the same rejection.
    pub fn resolve_with(
        &mut self,
        action_id: &str,
        actor: TokenId,
        intent: TargetIntent,
        hooks: &dyn EffectHooks,
        base_advantage: AdvantageState,
    ) -> Result<ResolutionReport> {
        let def = self
            .actions
            .get(action_id)
            .ok_or_else(|| RuntimeError::UnknownAction(action_id.to_string()))?
            .clone();

        let span = tracing::debug_span!("resolve_action", action = %def.id, actor = actor.0);
        let _guard = span.enter();

        let ctx = ResolveContext {
            blocking: &self.blocking,
            light: Some(&self.light),
            ledger: None,
            rng: &self.rng,
            hooks,
            base_seed: compute_seed(self.base_seed, actor.0, self.resolutions),
            base_advantage,
        };

        match resolve_action(&def, &self.state, actor, &intent, &ctx)? {
            ActionResolution::Resolved {
                outcome,
                state,
                events,
            } => {
                self.state = state;
                self.resolutions += 1;
                log_events(&events);
                tracing::debug!(?outcome, events = events.len(), "action resolved");
                Ok(ResolutionReport::Resolved { outcome, events })
            }
            ActionResolution::Rejected(rejection) => {
                tracing::debug!(reason = ?rejection.reason, "action rejected");
                Ok(ResolutionReport::Rejected(rejection))
            }
        }
    }
}

/// Emits one structured log line per event, with the full record as json.
fn log_events(events: &[ActionEvent]) {
    for event in events {
        match serde_json::to_string(event) {
            Ok(payload) => tracing::debug!(kind = ?event.kind, %payload, "event"),
            Err(err) => tracing::warn!(kind = ?event.kind, %err, "event not serializable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{
        BoardState, EffectKind, Formula, GridDimensions, StatusInstance, StatusKind, TargetingSpec,
        Team,
    };

    fn empty_session() -> Encounter {
        let board = BoardState::open(GridDimensions::new(8, 8));
        Encounter::new(EncounterState::new(board))
    }

    #[test]
    fn unknown_action_is_a_runtime_error() {
        let mut session = empty_session();
        let actor = session.add_token(Token::new(TokenId(0), "pc", Team::Player, Cell::new(1, 1)));
        let err = session
            .resolve("missing", actor, TargetIntent::None)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownAction(_)));
    }

    #[test]
    fn begin_phase_resets_only_the_acting_team() {
        let mut session = empty_session();
        let pc = session.add_token(Token::new(TokenId(0), "pc", Team::Player, Cell::new(1, 1)));
        let orc = session.add_token(Token::new(TokenId(0), "orc", Team::Enemy, Cell::new(2, 1)));
        for id in [pc, orc] {
            let token = session.state.tokens.get_mut(id).unwrap();
            token.flags = EconomyFlags::ACTION_USED;
            token.usage.entry("slam".into()).or_default().this_turn = 2;
        }

        session.begin_phase(TurnPhase::Player);
        assert!(session.token(pc).unwrap().flags.is_empty());
        assert_eq!(session.token(pc).unwrap().usage_of("slam").this_turn, 0);
        // Enemy economy untouched until its own phase opens.
        assert!(!session.token(orc).unwrap().flags.is_empty());
        assert_eq!(session.token(orc).unwrap().usage_of("slam").this_turn, 2);
    }

    #[test]
    fn end_round_expires_statuses() {
        let mut session = empty_session();
        let pc = session.add_token(Token::new(TokenId(0), "pc", Team::Player, Cell::new(1, 1)));
        session
            .state
            .tokens
            .get_mut(pc)
            .unwrap()
            .statuses
            .push(StatusInstance {
                kind: StatusKind::Poisoned,
                remaining_rounds: 2,
            });

        session.end_round();
        assert!(session.token(pc).unwrap().has_status(StatusKind::Poisoned));
        session.end_round();
        assert!(!session.token(pc).unwrap().has_status(StatusKind::Poisoned));
        assert_eq!(session.state().round, 3);
    }

    #[test]
    fn resolved_heal_commits_into_the_session() {
        let mut session = empty_session();
        let pc = session.add_token(
            Token::new(TokenId(0), "pc", Team::Player, Cell::new(1, 1)).with_hp(10),
        );
        session.state.tokens.get_mut(pc).unwrap().hp.deplete(6);

        session.register_action(
            ActionDefinition::new("second-wind", "Second Wind", TargetingSpec::self_only())
                .with_effect(EffectKind::Heal {
                    formula: Formula::Constant(4),
                }),
        );
        let report = session
            .resolve("second-wind", pc, TargetIntent::None)
            .unwrap();
        assert!(!report.is_rejected());
        assert_eq!(session.token(pc).unwrap().hp.current, 8);
    }
}
