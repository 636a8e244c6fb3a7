/// Tactical-motif detectors: pin, fork, skewer, double attack.
///
/// All detectors are pseudo-legal pattern scans over the raw board; they do
/// not ask whether the tactic survives the reply. A sliding piece pins or
/// skewers along its natural rays; a fork needs two targets at least as
/// valuable as the forking piece; a double attack is any enemy piece hit
/// twice. Kings count at a high value so king-directed tactics register.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chess_core::{PieceKind, Position, Square};

use crate::board_utils::{
    attacked_enemy_squares, attackers_of, king_value, pieces_along_ray, piece_value,
    ray_directions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacticalMotif {
    Pin,
    Fork,
    Skewer,
    DiscoveredAttack,
    DoubleAttack,
    Sacrifice,
    Deflection,
    Decoy,
    RemovalOfDefender,
    Interference,
    Overloading,
    Zugzwang,
}

impl TacticalMotif {
    pub const ALL: [TacticalMotif; 12] = [
        TacticalMotif::Pin,
        TacticalMotif::Fork,
        TacticalMotif::Skewer,
        TacticalMotif::DiscoveredAttack,
        TacticalMotif::DoubleAttack,
        TacticalMotif::Sacrifice,
        TacticalMotif::Deflection,
        TacticalMotif::Decoy,
        TacticalMotif::RemovalOfDefender,
        TacticalMotif::Interference,
        TacticalMotif::Overloading,
        TacticalMotif::Zugzwang,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TacticalMotif::Pin => "PIN",
            TacticalMotif::Fork => "FORK",
            TacticalMotif::Skewer => "SKEWER",
            TacticalMotif::DiscoveredAttack => "DISCOVERED_ATTACK",
            TacticalMotif::DoubleAttack => "DOUBLE_ATTACK",
            TacticalMotif::Sacrifice => "SACRIFICE",
            TacticalMotif::Deflection => "DEFLECTION",
            TacticalMotif::Decoy => "DECOY",
            TacticalMotif::RemovalOfDefender => "REMOVAL_OF_DEFENDER",
            TacticalMotif::Interference => "INTERFERENCE",
            TacticalMotif::Overloading => "OVERLOADING",
            TacticalMotif::Zugzwang => "ZUGZWANG",
        }
    }
}

impl fmt::Display for TacticalMotif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TacticalMotif {
    type Err = ();

    fn from_str(s: &str) -> Result<TacticalMotif, ()> {
        let upper = s.trim().to_ascii_uppercase();
        TacticalMotif::ALL
            .into_iter()
            .find(|motif| motif.name() == upper)
            .ok_or(())
    }
}

/// All motifs with a detector that triggers on this position.
pub fn detect_motifs(position: &Position) -> Vec<TacticalMotif> {
    let mut motifs = Vec::new();
    if detect_pin(position) {
        motifs.push(TacticalMotif::Pin);
    }
    if detect_fork(position) {
        motifs.push(TacticalMotif::Fork);
    }
    if detect_skewer(position) {
        motifs.push(TacticalMotif::Skewer);
    }
    if detect_double_attack(position) {
        motifs.push(TacticalMotif::DoubleAttack);
    }
    motifs
}

/// Walks each sliding piece's rays collecting the first two pieces found.
/// Both enemy with the nearer one cheaper: pin. Nearer one pricier (and at
/// least minor-piece value): skewer.
fn scan_rays(position: &Position, accept: impl Fn(PieceKind, PieceKind) -> bool) -> bool {
    for attacker_sq in Square::all() {
        let Some(attacker) = position.piece_at(attacker_sq) else {
            continue;
        };
        let dirs = ray_directions(attacker.kind());
        if dirs.is_empty() {
            continue;
        }

        for &dir in dirs {
            let in_line = pieces_along_ray(position, attacker_sq, dir);
            if in_line.len() < 2 {
                continue;
            }
            let front = position.piece_at(in_line[0]).expect("ray square occupied");
            let back = position.piece_at(in_line[1]).expect("ray square occupied");
            if front.color() != attacker.color()
                && back.color() != attacker.color()
                && accept(front.kind(), back.kind())
            {
                return true;
            }
        }
    }
    false
}

pub fn detect_pin(position: &Position) -> bool {
    scan_rays(position, |front, back| king_value(back) > king_value(front))
}

pub fn detect_skewer(position: &Position) -> bool {
    scan_rays(position, |front, back| {
        king_value(front) > king_value(back) && king_value(front) >= 3
    })
}

/// A piece attacks two or more enemy pieces, each worth at least as much as
/// the attacker. Kings do not fork.
pub fn detect_fork(position: &Position) -> bool {
    for sq in Square::all() {
        let Some(attacker) = position.piece_at(sq) else {
            continue;
        };
        if attacker.kind() == PieceKind::King {
            continue;
        }

        let threshold = piece_value(attacker.kind());
        let valuable_targets = attacked_enemy_squares(position, sq)
            .iter()
            .filter(|(_, target)| king_value(target.kind()) >= threshold)
            .count();
        if valuable_targets >= 2 {
            return true;
        }
    }
    false
}

/// Some enemy piece is attacked by two or more pieces of the same side.
pub fn detect_double_attack(position: &Position) -> bool {
    for sq in Square::all() {
        let Some(target) = position.piece_at(sq) else {
            continue;
        };
        if attackers_of(position, !target.color(), sq).count() >= 2 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_knight_fork_on_king_and_rook() {
        // White knight on c7 forks the black king on e8 and rook on a8
        let position = pos("r3k3/2N5/8/8/8/8/8/4K3 w - - 0 1");
        assert!(detect_fork(&position));
        assert!(detect_motifs(&position).contains(&TacticalMotif::Fork));
    }

    #[test]
    fn test_no_fork_without_second_target(){
        let position = pos("4k3/2N5/8/8/8/8/8/4K3 w - - 0 1");
        assert!(!detect_fork(&position));
    }

    #[test]
    fn test_fork_needs_equal_or_better_targets() {
        // Rook attacks two pawns: both cheaper than a rook, no fork
        let position = pos("4k3/8/8/p7/R6p/8/8/4K3 w - - 0 1");
        assert!(!detect_fork(&position));
    }

    #[test]
    fn test_bishop_pin() {
        // Bishop on b5 pins the c6 knight against the e8 king
        let position = pos("4k3/8/2n5/1B6/8/8/8/4K3 w - - 0 1");
        assert!(detect_pin(&position));
        assert!(detect_motifs(&position).contains(&TacticalMotif::Pin));
    }

    #[test]
    fn test_rook_skewer() {
        // Rook on a8 hits the queen on d8; the cheap bishop hides behind on g8
        let position = pos("R2q2b1/8/8/8/8/8/8/k3K3 w - - 0 1");
        assert!(detect_skewer(&position));
    }

    #[test]
    fn test_skewer_front_must_be_minor_or_better() {
        // Pawn in front of a pawn is no skewer
        let position = pos("4k3/8/8/8/8/1p6/1p6/1R2K3 b - - 0 1");
        assert!(!detect_skewer(&position));
    }

    #[test]
    fn test_double_attack() {
        // Knight f3 and rook e1 both attack the e5 pawn
        let position = pos("4k3/8/8/4p3/8/5N2/8/4RK2 w - - 0 1");
        assert!(detect_double_attack(&position));
        assert!(detect_motifs(&position).contains(&TacticalMotif::DoubleAttack));
    }

    #[test]
    fn test_quiet_position_has_no_motifs() {
        let position = pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(detect_motifs(&position).is_empty());
    }

    #[test]
    fn test_motif_names_round_trip() {
        for motif in TacticalMotif::ALL {
            assert_eq!(motif.name().parse::<TacticalMotif>(), Ok(motif));
        }
        assert_eq!("fork".parse::<TacticalMotif>(), Ok(TacticalMotif::Fork));
        assert!("NOT_A_MOTIF".parse::<TacticalMotif>().is_err());
    }
}
