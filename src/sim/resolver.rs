//! Contact resolution: what touching each kind of entity does
//!
//! | kind   | effect                                                     |
//! |--------|------------------------------------------------------------|
//! | Star   | removed, score +1                                          |
//! | Vortex | player frozen, score -1, death sequence then respawn       |
//! | Finish | player frozen, level complete                              |
//! | Portal | player frozen and moved to the partner, both portals gone  |
//!
//! Walls never get here; they are solid and handled by the physics step.

use glam::Vec2;

use super::physics::Contact;
use super::registry::{EntityId, EntityKind, EntityRegistry};
use super::state::{GamePhase, GameState, Player};

/// Game effect produced by one contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    StarCollected {
        star: EntityId,
    },
    /// Player is frozen; a death sequence toward the vortex must follow
    VortexEntered {
        vortex: EntityId,
        from: Vec2,
        to: Vec2,
    },
    LevelFinished {
        finish: EntityId,
    },
    /// Player is frozen at the exit; a transit animation must follow
    Teleported {
        entry: EntityId,
        exit: EntityId,
        from: Vec2,
        to: Vec2,
    },
    /// Portal with no partner: nothing happened
    PortalUnpaired {
        portal: EntityId,
    },
}

/// Apply the effect of one contact.
///
/// Returns `None` when the contact no longer applies: the player is already
/// frozen by an earlier contact, or the entity is gone.
pub fn resolve(
    contact: &Contact,
    state: &mut GameState,
    registry: &mut EntityRegistry,
    player: &mut Player,
) -> Option<Effect> {
    if player.frozen {
        return None;
    }
    let entity = registry.get(contact.entity).filter(|e| e.alive)?;
    let position = entity.position;

    match contact.kind {
        EntityKind::Star => {
            registry.remove_entity(contact.entity);
            state.score += 1;
            log::debug!("Star {:?} collected, score {}", contact.entity, state.score);
            Some(Effect::StarCollected {
                star: contact.entity,
            })
        }
        EntityKind::Vortex => {
            player.freeze();
            state.score -= 1;
            log::debug!("Vortex {:?} hit, score {}", contact.entity, state.score);
            Some(Effect::VortexEntered {
                vortex: contact.entity,
                from: player.position,
                to: position,
            })
        }
        EntityKind::Finish => {
            player.freeze();
            state.phase = GamePhase::LevelComplete;
            log::debug!("Finish {:?} reached", contact.entity);
            Some(Effect::LevelFinished {
                finish: contact.entity,
            })
        }
        EntityKind::Portal => {
            player.freeze();
            let exit = registry
                .entities_of_kind(EntityKind::Portal)
                .find(|p| p.id != contact.entity)
                .map(|p| (p.id, p.position));

            let Some((exit, destination)) = exit else {
                player.frozen = false;
                log::debug!("Portal {:?} has no partner", contact.entity);
                return Some(Effect::PortalUnpaired {
                    portal: contact.entity,
                });
            };

            let from = player.position;
            player.position = destination;
            registry.remove_entity(contact.entity);
            registry.remove_entity(exit);
            log::debug!("Portal {:?} -> {:?}", contact.entity, exit);
            Some(Effect::Teleported {
                entry: contact.entity,
                exit,
                from,
                to: destination,
            })
        }
        EntityKind::Wall => None,
    }
}

/// Resolve contacts in order until one freezes the player
pub fn resolve_all(
    contacts: &[Contact],
    state: &mut GameState,
    registry: &mut EntityRegistry,
    player: &mut Player,
) -> Vec<Effect> {
    contacts
        .iter()
        .filter_map(|contact| resolve(contact, state, registry, player))
        .collect()
}
