//! Scripted player for headless runs.
//!
//! Each step the autopilot looks at the encounter and produces the input a
//! player would: dodge-roll away from a live hitbox or an incoming arrow,
//! otherwise close in on the nearest enemy and swing once in reach.

use duskfall_common::{BoundingRectangle, Direction};
use duskfall_gameplay::{CombatActor, Encounter, PlayerCombatant, PlayerInput, PlayerView};
use tracing::trace;

/// Horizontal gap at which a live enemy hitbox triggers a roll.
const DANGER_GAP: f32 = 40.0;
/// Horizontal gap at which an approaching arrow triggers a roll.
const ARROW_WARNING_GAP: f32 = 160.0;
/// Longest pause between swings, at zero aggressiveness.
const MAX_SWING_PAUSE: f32 = 1.0;
/// Distance kept from the target while waiting out a pause, at zero
/// aggressiveness.
const MAX_STANDOFF: f32 = 120.0;

/// Something that can hurt the player this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    /// Area that deals damage
    pub area: BoundingRectangle,
    /// Travel direction for projectiles; `None` for melee hitboxes
    pub heading: Option<Direction>,
}

/// Horizontal distance between two rectangles; zero when they overlap.
#[must_use]
pub fn horizontal_gap(a: &BoundingRectangle, b: &BoundingRectangle) -> f32 {
    (a.left() - b.right()).max(b.left() - a.right()).max(0.0)
}

/// Input generator for the player.
#[derive(Debug, Clone)]
pub struct Autopilot {
    aggressiveness: f32,
    swing_pause: f32,
}

impl Autopilot {
    /// Creates an autopilot; `aggressiveness` in `[0, 1]` shortens the
    /// pause between swings and the standoff distance.
    #[must_use]
    pub fn new(aggressiveness: f32) -> Self {
        Self {
            aggressiveness: aggressiveness.clamp(0.0, 1.0),
            swing_pause: 0.0,
        }
    }

    /// Aggressiveness in `[0, 1]`.
    #[must_use]
    pub fn aggressiveness(&self) -> f32 {
        self.aggressiveness
    }

    /// Decides the player's input for the next step of `encounter`.
    pub fn decide(&mut self, dt: f32, encounter: &Encounter) -> PlayerInput {
        let player = encounter.player();
        if player.is_dead() {
            return PlayerInput::NONE;
        }

        let mut hazards = Vec::new();
        let mut target: Option<BoundingRectangle> = None;
        let player_x = player.bounds().center().x;

        for combatant in encounter.enemies() {
            let enemy = &combatant.enemy;
            if enemy.is_attack_hitbox_active() {
                hazards.push(Hazard {
                    area: enemy.attack_box(),
                    heading: None,
                });
            }
            hazards.extend(enemy.projectiles().iter().map(|p| Hazard {
                area: p.bounds(),
                heading: Some(p.direction()),
            }));

            if enemy.is_dead() {
                continue;
            }
            let bounds = enemy.bounds();
            let closer = target.map_or(true, |best| {
                (bounds.center().x - player_x).abs() < (best.center().x - player_x).abs()
            });
            if closer {
                target = Some(bounds);
            }
        }

        let input = self.choose(
            dt,
            &player.bounds(),
            player.direction(),
            player.attack_box().width,
            player.is_invulnerable(),
            &hazards,
            target.as_ref(),
        );
        trace!("Autopilot input {input:?}");
        input
    }

    /// Picks an input from an already-gathered view of the scene.
    #[allow(clippy::too_many_arguments)]
    pub fn choose(
        &mut self,
        dt: f32,
        player: &BoundingRectangle,
        facing: Direction,
        reach: f32,
        invulnerable: bool,
        hazards: &[Hazard],
        target: Option<&BoundingRectangle>,
    ) -> PlayerInput {
        self.swing_pause = (self.swing_pause - dt).max(0.0);

        if !invulnerable {
            if let Some(threat) = hazards.iter().find(|h| Self::threatens(player, h)) {
                let away = Direction::toward(threat.area.center().x, player.center().x);
                return PlayerInput {
                    roll: true,
                    ..PlayerInput::walk(away)
                };
            }
        }

        let Some(target) = target else {
            return PlayerInput::NONE;
        };

        let toward = Direction::toward(player.center().x, target.center().x);
        let gap = horizontal_gap(player, target);

        if gap <= reach {
            if facing != toward {
                return PlayerInput::walk(toward);
            }
            if self.swing_pause <= 0.0 {
                self.swing_pause = (1.0 - self.aggressiveness) * MAX_SWING_PAUSE;
                return PlayerInput {
                    attack: true,
                    ..PlayerInput::NONE
                };
            }
            return PlayerInput::NONE;
        }

        // Hang back while a swing pause is still running.
        let standoff = (1.0 - self.aggressiveness) * MAX_STANDOFF;
        if self.swing_pause > 0.0 && gap <= reach + standoff {
            return PlayerInput::NONE;
        }
        PlayerInput::walk(toward)
    }

    fn threatens(player: &BoundingRectangle, hazard: &Hazard) -> bool {
        let gap = horizontal_gap(player, &hazard.area);
        match hazard.heading {
            None => gap <= DANGER_GAP,
            Some(heading) => {
                let incoming =
                    Direction::toward(hazard.area.center().x, player.center().x) == heading;
                incoming && gap <= ARROW_WARNING_GAP
            },
        }
    }
}
