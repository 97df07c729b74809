//! ZIA: a sandbox space game of trading, combat, exploration and missions.
//!
//! Sectors sit on an axial hex map keyed `"q,r"`. Each player flies one
//! merchant ship and earns fame by selling goods, winning fights, exploring
//! sectors and completing missions. The first player to reach
//! [`FAME_TO_WIN`] fame wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Context, MoveArgs, PlayerId, PlayerMap, SetupContext, TurnConfig};
use crate::definition::{GameDefinition, MoveSpec};
use crate::error::{DefinitionError, MoveError};
use crate::primitives::{ResourcePool, Track};
use crate::rules::GameResult;
use crate::validation::{ArgKind, ValidationRequest, Verdict};

pub const FAME_TO_WIN: i32 = 20;
pub const STARTING_CREDITS: u32 = 10;
pub const STARTING_SECTOR: &str = "0,0";

pub const PLAYER_COLORS: &[&str] = &["red", "blue", "green", "yellow"];
pub const GOOD_TYPES: &[&str] = &["ore", "grain", "tech", "luxury"];

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    #[must_use]
    pub fn key(self) -> String {
        format!("{},{}", self.q, self.r)
    }

    #[must_use]
    pub fn distance(self, other: Axial) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        dq.max(dr).max((self.q + self.r - other.q - other.r).abs())
    }

    #[must_use]
    pub fn is_adjacent(self, other: Axial) -> bool {
        self.distance(other) == 1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub at: Axial,
    pub name: String,
    pub good: String,
    pub buy_price: u32,
    pub sell_price: u32,
    pub explored: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipClass {
    Explorer,
    Merchant,
    Fighter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub sector: String,
    pub class: ShipClass,
    pub engine: u32,
    pub weapons: u32,
    pub hull: u32,
    pub cargo_capacity: u32,
    pub cargo: ResourcePool,
    /// Times this ship has been destroyed and sent back to the start.
    pub destroyed: u32,
}

impl Ship {
    #[must_use]
    pub fn new(sector: &str, class: ShipClass) -> Self {
        let (engine, weapons, hull, cargo_capacity) = match class {
            ShipClass::Explorer => (3, 1, 2, 2),
            ShipClass::Merchant => (2, 1, 2, 4),
            ShipClass::Fighter => (2, 3, 3, 1),
        };
        Self {
            sector: sector.to_string(),
            class,
            engine,
            weapons,
            hull,
            cargo_capacity,
            cargo: ResourcePool::new(),
            destroyed: 0,
        }
    }

    #[must_use]
    pub fn cargo_used(&self) -> u64 {
        self.cargo.total()
    }

    /// Take one point of hull damage. A ship with no hull left is sent back
    /// to the start with its cargo lost. Returns `true` if that happened.
    fn take_hit(&mut self) -> bool {
        self.hull = self.hull.saturating_sub(1);
        if self.hull > 0 {
            return false;
        }
        self.sector = STARTING_SECTOR.to_string();
        self.hull = 1;
        self.cargo = ResourcePool::new();
        self.destroyed += 1;
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiaPlayer {
    pub color: String,
    pub credits: u32,
    pub fame: Track,
}

impl ZiaPlayer {
    fn penalize_destroyed(&mut self) {
        self.credits = self.credits.saturating_sub(2);
        self.fame.advance(-1);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MissionKind {
    Deliver { sector: String, good: String },
    Explore { sector: String },
    Bounty { target: PlayerId },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub kind: MissionKind,
    pub reward_fame: i32,
    pub reward_credits: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiaState {
    pub sectors: BTreeMap<String, Sector>,
    pub ships: PlayerMap<Ship>,
    pub players: PlayerMap<ZiaPlayer>,
    pub movement_points: u32,
    pub missions: BTreeMap<String, Mission>,
    /// Missions still open, in deck order.
    pub mission_deck: Vec<String>,
}

const INITIAL_HEXES: &[(i32, i32, &str, &str, u32, u32)] = &[
    (0, 0, "Nexus", "tech", 4, 6),
    (1, 0, "Rust", "ore", 2, 4),
    (1, -1, "Amber", "grain", 3, 5),
    (0, -1, "Drift", "luxury", 6, 8),
    (-1, 0, "Void", "ore", 2, 4),
    (-1, 1, "Haven", "grain", 3, 5),
    (0, 1, "Spire", "tech", 4, 7),
];

fn initial_sectors() -> BTreeMap<String, Sector> {
    INITIAL_HEXES
        .iter()
        .map(|&(q, r, name, good, buy_price, sell_price)| {
            let at = Axial { q, r };
            let sector = Sector {
                id: at.key(),
                at,
                name: name.to_string(),
                good: good.to_string(),
                buy_price,
                sell_price,
                explored: false,
            };
            (sector.id.clone(), sector)
        })
        .collect()
}

fn initial_missions() -> BTreeMap<String, Mission> {
    let missions = [
        Mission {
            id: "m1".into(),
            kind: MissionKind::Deliver {
                sector: "0,-1".into(),
                good: "grain".into(),
            },
            reward_fame: 3,
            reward_credits: 2,
        },
        Mission {
            id: "m2".into(),
            kind: MissionKind::Deliver {
                sector: "1,0".into(),
                good: "ore".into(),
            },
            reward_fame: 2,
            reward_credits: 3,
        },
        Mission {
            id: "m3".into(),
            kind: MissionKind::Explore {
                sector: "1,-1".into(),
            },
            reward_fame: 3,
            reward_credits: 0,
        },
        Mission {
            id: "m4".into(),
            kind: MissionKind::Bounty {
                target: PlayerId::new(1),
            },
            reward_fame: 4,
            reward_credits: 5,
        },
    ];
    missions.into_iter().map(|m| (m.id.clone(), m)).collect()
}

fn setup(ctx: &mut SetupContext<'_>, _data: Option<&Value>) -> ZiaState {
    let missions = initial_missions();
    ZiaState {
        sectors: initial_sectors(),
        ships: PlayerMap::new(ctx.num_players, |_| Ship::new(STARTING_SECTOR, ShipClass::Merchant)),
        players: PlayerMap::new(ctx.num_players, |pid| ZiaPlayer {
            color: PLAYER_COLORS[pid.index() % PLAYER_COLORS.len()].to_string(),
            credits: STARTING_CREDITS,
            fame: Track::new(0, FAME_TO_WIN, 0, "Fame"),
        }),
        movement_points: 0,
        mission_deck: missions.keys().cloned().collect(),
        missions,
    }
}

fn seat<T>(map: &mut PlayerMap<T>, player: PlayerId) -> Result<&mut T, MoveError> {
    map.get_mut(player)
        .ok_or_else(|| MoveError::fault(format!("player {player} has no seat")))
}

fn set_player_color(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let color = args.str(0)?;
    if !PLAYER_COLORS.contains(&color) {
        return Err(MoveError::because("Invalid color"));
    }
    seat(&mut state.players, ctx.player)?.color = color.to_string();
    Ok(())
}

fn pass(_state: &mut ZiaState, _ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
    Ok(())
}

fn roll_movement(state: &mut ZiaState, ctx: &mut Context<'_>, _args: &MoveArgs) -> Result<(), MoveError> {
    let engine = seat(&mut state.ships, ctx.current_player)?.engine;
    state.movement_points = ctx.random.d6() + engine;
    Ok(())
}

fn move_ship(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let target = args.str(0)?;
    if state.movement_points == 0 {
        return Err(MoveError::because("No movement points left"));
    }
    let to = state
        .sectors
        .get(target)
        .ok_or_else(|| MoveError::because("Unknown sector"))?
        .at;

    let ship = seat(&mut state.ships, ctx.current_player)?;
    let from = state
        .sectors
        .get(&ship.sector)
        .ok_or_else(|| MoveError::fault(format!("ship is in unknown sector {}", ship.sector)))?
        .at;
    if !from.is_adjacent(to) {
        return Err(MoveError::because("Sector is not adjacent"));
    }

    ship.sector = target.to_string();
    state.movement_points -= 1;
    Ok(())
}

/// Shared checks for trading: the ship must be in `sector` and the sector
/// must trade `good`.
fn market<'s>(state: &'s ZiaState, ship: &Ship, sector: &str, good: &str) -> Result<&'s Sector, MoveError> {
    if ship.sector != sector {
        return Err(MoveError::because("Ship is not in that sector"));
    }
    let market = state
        .sectors
        .get(sector)
        .ok_or_else(|| MoveError::because("Unknown sector"))?;
    if market.good != good {
        return Err(MoveError::because("Sector does not trade that good"));
    }
    Ok(market)
}

fn buy_goods(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let (sector, good, quantity) = (args.str(0)?, args.str(1)?, args.quantity(2)?);
    let pid = ctx.current_player;

    let ship = state.ships.get(pid).ok_or_else(|| MoveError::fault("no ship"))?;
    let price = market(state, ship, sector, good)?.buy_price;
    let cost = price.saturating_mul(quantity);

    let credits = state.players.get(pid).map_or(0, |p| p.credits);
    if credits < cost {
        return Err(MoveError::because("Not enough credits"));
    }
    if ship.cargo_used() + u64::from(quantity) > u64::from(ship.cargo_capacity) {
        return Err(MoveError::because("Not enough cargo space"));
    }

    seat(&mut state.players, pid)?.credits -= cost;
    seat(&mut state.ships, pid)?.cargo.add(good, quantity);
    Ok(())
}

fn sell_goods(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let (sector, good, quantity) = (args.str(0)?, args.str(1)?, args.quantity(2)?);
    let pid = ctx.current_player;

    let ship = state.ships.get(pid).ok_or_else(|| MoveError::fault("no ship"))?;
    let price = market(state, ship, sector, good)?.sell_price;

    seat(&mut state.ships, pid)?.cargo.remove(good, quantity)?;
    let player = seat(&mut state.players, pid)?;
    player.credits = player.credits.saturating_add(price.saturating_mul(quantity));
    player.fame.advance(1);
    Ok(())
}

fn attack(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let target: PlayerId = args
        .str(0)?
        .parse()
        .map_err(|_| MoveError::because("Invalid target"))?;
    let pid = ctx.current_player;
    if target == pid {
        return Err(MoveError::because("Cannot attack yourself"));
    }

    let attacker = state.ships.get(pid).ok_or_else(|| MoveError::fault("no ship"))?;
    let defender = state
        .ships
        .get(target)
        .ok_or_else(|| MoveError::because("Invalid target"))?;
    if attacker.sector != defender.sector {
        return Err(MoveError::because("Target is not in your sector"));
    }

    let attack_score = ctx.random.d6() + attacker.weapons;
    let defend_score = ctx.random.d6() + defender.weapons;
    let (winner, loser) = if attack_score > defend_score {
        (pid, target)
    } else {
        (target, pid)
    };

    seat(&mut state.players, winner)?.fame.advance(2);
    if seat(&mut state.ships, loser)?.take_hit() {
        seat(&mut state.players, loser)?.penalize_destroyed();
    }
    Ok(())
}

fn explore(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let sector_id = args.str(0)?;
    let pid = ctx.current_player;

    let ship = state.ships.get(pid).ok_or_else(|| MoveError::fault("no ship"))?;
    if ship.sector != sector_id {
        return Err(MoveError::because("Ship is not in that sector"));
    }
    let sector = state
        .sectors
        .get_mut(sector_id)
        .ok_or_else(|| MoveError::because("Unknown sector"))?;
    if sector.explored {
        return Err(MoveError::because("Sector already explored"));
    }

    sector.explored = true;
    seat(&mut state.players, pid)?.fame.advance(2);
    Ok(())
}

fn complete_mission(state: &mut ZiaState, ctx: &mut Context<'_>, args: &MoveArgs) -> Result<(), MoveError> {
    let mission_id = args.str(0)?;
    let pid = ctx.current_player;

    if !state.mission_deck.iter().any(|id| id == mission_id) {
        return Err(MoveError::because("Mission is not available"));
    }
    let mission = state
        .missions
        .get(mission_id)
        .cloned()
        .ok_or_else(|| MoveError::fault(format!("mission {mission_id} is in the deck but undefined")))?;

    match &mission.kind {
        MissionKind::Deliver { sector, good } => {
            let ship = seat(&mut state.ships, pid)?;
            if ship.sector != *sector {
                return Err(MoveError::because("Ship is not at the delivery sector"));
            }
            ship.cargo.remove(good, 1)?;
        }
        MissionKind::Explore { sector } => {
            let explored = state.sectors.get(sector).is_some_and(|s| s.explored);
            if !explored {
                return Err(MoveError::because("Target sector is not explored"));
            }
        }
        MissionKind::Bounty { target } => {
            if *target == pid {
                return Err(MoveError::because("Cannot claim a bounty on yourself"));
            }
            let destroyed = state.ships.get(*target).is_some_and(|s| s.destroyed > 0);
            if !destroyed {
                return Err(MoveError::because("Bounty target has not been destroyed"));
            }
        }
    }

    let player = seat(&mut state.players, pid)?;
    player.fame.advance(mission.reward_fame);
    player.credits = player.credits.saturating_add(mission.reward_credits);
    state.mission_deck.retain(|id| id != mission_id);
    Ok(())
}

fn end_if(state: &ZiaState) -> Option<GameResult> {
    state
        .players
        .iter()
        .find(|(_, p)| p.fame.is_at_max())
        .map(|(pid, _)| GameResult::Winner(pid))
}

fn validate(_state: &ZiaState, request: &ValidationRequest<'_>) -> Verdict {
    let args = &request.mv.args;
    let is_str = |i: usize| args.get(i).is_some_and(Value::is_string);

    match request.mv.name.as_str() {
        "moveShip" | "explore" if !is_str(0) => Verdict::reject("Invalid sector"),
        "attack" if !is_str(0) => Verdict::reject("Invalid target"),
        "completeMission" if !is_str(0) => Verdict::reject("Invalid mission"),
        "buyGoods" | "sellGoods" => {
            let quantity_ok = args.get(2).and_then(Value::as_u64).is_some_and(|q| q >= 1);
            if is_str(0) && quantity_ok {
                Verdict::Allow
            } else {
                Verdict::reject("Invalid args")
            }
        }
        _ => Verdict::Allow,
    }
}

const COLOR: &[ArgKind] = &[ArgKind::OneOf(PLAYER_COLORS)];
const TRADE: &[ArgKind] = &[ArgKind::Str, ArgKind::OneOf(GOOD_TYPES), ArgKind::Any];

/// The ZIA definition.
pub fn game_def() -> Result<GameDefinition<ZiaState>, DefinitionError> {
    GameDefinition::builder("zia", setup)
        .display_name("ZIA: Become a Legend")
        .description(
            "A sandbox space game: trade, fight, explore, complete missions, and earn fame to become a legend.",
        )
        .players(2, 4)
        .move_spec(
            "setPlayerColor",
            MoveSpec::new(set_player_color).args(COLOR).turn_exempt(),
        )
        .move_fn("pass", pass)
        .move_fn("rollMovement", roll_movement)
        .move_fn("moveShip", move_ship)
        .move_spec("buyGoods", MoveSpec::new(buy_goods).args(TRADE))
        .move_spec("sellGoods", MoveSpec::new(sell_goods).args(TRADE))
        .move_fn("attack", attack)
        .move_fn("explore", explore)
        .move_fn("completeMission", complete_mission)
        .turn(TurnConfig::new(1, 10))
        .end_if(end_if)
        .validate_move(validate)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameRng, Move};
    use serde_json::json;

    fn fresh() -> ZiaState {
        let mut rng = GameRng::new(0);
        setup(&mut SetupContext::new(2, &mut rng), None)
    }

    fn run(
        state: &mut ZiaState,
        handler: crate::definition::MoveFn<ZiaState>,
        player: u8,
        args: Vec<Value>,
    ) -> Result<(), MoveError> {
        let mut rng = GameRng::new(5);
        let mut ctx = Context::new(PlayerId::new(player), 2, 1, &mut rng);
        handler(state, &mut ctx, &Move::with_args("m", args).args)
    }

    #[test]
    fn test_hex_adjacency() {
        let origin = Axial { q: 0, r: 0 };
        assert!(origin.is_adjacent(Axial { q: 1, r: -1 }));
        assert!(origin.is_adjacent(Axial { q: -1, r: 1 }));
        assert!(!origin.is_adjacent(Axial { q: 1, r: 1 }));
        assert_eq!(Axial { q: 1, r: 0 }.distance(Axial { q: -1, r: 0 }), 2);
    }

    #[test]
    fn test_setup() {
        let state = fresh();
        assert_eq!(state.sectors.len(), 7);
        assert_eq!(state.sectors["0,0"].name, "Nexus");
        assert_eq!(state.players[PlayerId::new(1)].color, "blue");
        assert_eq!(state.players[PlayerId::new(0)].credits, STARTING_CREDITS);
        assert_eq!(state.ships[PlayerId::new(0)].cargo_capacity, 4);
        assert_eq!(state.mission_deck, vec!["m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_move_ship_needs_points_and_adjacency() {
        let mut state = fresh();
        assert!(run(&mut state, move_ship, 0, vec![json!("1,0")]).is_err());

        state.movement_points = 2;
        assert!(run(&mut state, move_ship, 0, vec![json!("1,1")]).is_err());
        run(&mut state, move_ship, 0, vec![json!("1,0")]).unwrap();
        assert_eq!(state.ships[PlayerId::new(0)].sector, "1,0");
        assert_eq!(state.movement_points, 1);
    }

    #[test]
    fn test_buy_and_sell() {
        let mut state = fresh();
        run(&mut state, buy_goods, 0, vec![json!("0,0"), json!("tech"), json!(2)]).unwrap();

        assert_eq!(state.players[PlayerId::new(0)].credits, 2);
        assert_eq!(state.ships[PlayerId::new(0)].cargo.get("tech"), 2);

        run(&mut state, sell_goods, 0, vec![json!("0,0"), json!("tech"), json!(1)]).unwrap();
        assert_eq!(state.players[PlayerId::new(0)].credits, 8);
        assert_eq!(state.players[PlayerId::new(0)].fame.position(), 1);
        assert_eq!(state.ships[PlayerId::new(0)].cargo.get("tech"), 1);
    }

    #[test]
    fn test_buy_wrong_good_rejected() {
        let mut state = fresh();
        let err = run(&mut state, buy_goods, 0, vec![json!("0,0"), json!("ore"), json!(1)]).unwrap_err();
        assert_eq!(err, MoveError::because("Sector does not trade that good"));
    }

    #[test]
    fn test_attack_resolves_one_hit() {
        let mut state = fresh();
        run(&mut state, attack, 0, vec![json!("1")]).unwrap();

        let hull: u32 = state.ships.iter().map(|(_, s)| s.hull).sum();
        let fame: i32 = state.players.iter().map(|(_, p)| p.fame.position()).sum();
        assert_eq!(hull, 3);
        assert_eq!(fame, 2);

        assert!(run(&mut state, attack, 0, vec![json!("0")]).is_err());
    }

    #[test]
    fn test_destroyed_ship_respawns() {
        let mut ship = Ship::new("1,0", ShipClass::Merchant);
        ship.cargo.add("ore", 3);

        assert!(!ship.take_hit());
        assert!(ship.take_hit());
        assert_eq!(ship.sector, STARTING_SECTOR);
        assert_eq!(ship.hull, 1);
        assert_eq!(ship.cargo.total(), 0);
        assert_eq!(ship.destroyed, 1);
    }

    #[test]
    fn test_explore_and_mission() {
        let mut state = fresh();
        state.ships[PlayerId::new(0)].sector = "1,-1".into();

        assert!(run(&mut state, complete_mission, 0, vec![json!("m3")]).is_err());
        run(&mut state, explore, 0, vec![json!("1,-1")]).unwrap();
        assert!(run(&mut state, explore, 0, vec![json!("1,-1")]).is_err());

        run(&mut state, complete_mission, 0, vec![json!("m3")]).unwrap();
        assert_eq!(state.players[PlayerId::new(0)].fame.position(), 5);
        assert!(!state.mission_deck.contains(&"m3".to_string()));
        assert!(run(&mut state, complete_mission, 0, vec![json!("m3")]).is_err());
    }

    #[test]
    fn test_bounty_needs_destroyed_target() {
        let mut state = fresh();
        assert!(run(&mut state, complete_mission, 0, vec![json!("m4")]).is_err());

        state.ships[PlayerId::new(1)].destroyed = 1;
        run(&mut state, complete_mission, 0, vec![json!("m4")]).unwrap();
        assert_eq!(state.players[PlayerId::new(0)].credits, 15);
    }

    #[test]
    fn test_fame_caps_and_wins() {
        let mut state = fresh();
        state.players[PlayerId::new(1)].fame.advance(25);
        assert_eq!(state.players[PlayerId::new(1)].fame.position(), FAME_TO_WIN);
        assert_eq!(end_if(&state), Some(GameResult::Winner(PlayerId::new(1))));
    }

    #[test]
    fn test_validate_hook() {
        let state = fresh();
        let check = |mv: Move| {
            validate(
                &state,
                &ValidationRequest {
                    player: PlayerId::new(0),
                    current_player: PlayerId::new(0),
                    num_players: 2,
                    mv: &mv,
                },
            )
        };

        assert_eq!(check(Move::with_args("moveShip", [3])), Verdict::reject("Invalid sector"));
        assert_eq!(
            check(Move::with_args("buyGoods", [json!("0,0"), json!("tech"), json!(0)])),
            Verdict::reject("Invalid args")
        );
        assert!(check(Move::new("rollMovement")).is_allowed());
    }
}
