//! Evolution reports
//!
//! For one entity, lists every revision of every branch that can see it,
//! labelled with whether the entity existed there. The walk starts at the
//! branch that created the entity and descends depth-first into the branches
//! forked from each revision.

use crate::branch::Branch;
use crate::elements::BranchElement;
use crate::histories::Histories;
use crate::tree::Tree;
use biome_versions::{Position, Version};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Whether an entity existed at a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Metadata was present
    Extant,
    /// Metadata was absent or explicitly cleared
    Extinct,
}

impl Display for Presence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extant => f.write_str("extant"),
            Self::Extinct => f.write_str("extinct"),
        }
    }
}

/// One line of an evolution report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRow {
    /// Fork depth below the founding branch
    pub distance: u32,
    /// The revision
    pub version: Version,
    /// Whether the entity existed there
    pub presence: Presence,
    /// Whether other branches fork from this revision
    pub fork: bool,
}

/// Build the evolution report of the entity at `founder`
///
/// Founder revisions are listed newest first, down to the first revision
/// that registered the entity. Each revision is followed by the rows of the
/// branches forked from it, one level deeper.
pub(crate) fn evolution<E: BranchElement>(
    tree: &Tree,
    histories: &Histories,
    founder: Position<E::Kind>,
) -> Vec<EvolutionRow> {
    let mut walk = Walk::<E> {
        tree,
        histories,
        founder,
        rows: Vec::new(),
    };
    match tree.get(founder.branch) {
        Ok(branch) => walk.branch(branch, 0, true),
        Err(error) => panic!("evolution of {founder} on a missing branch: {error}"),
    }
    walk.rows
}

struct Walk<'a, E: BranchElement> {
    tree: &'a Tree,
    histories: &'a Histories,
    founder: Position<E::Kind>,
    rows: Vec<EvolutionRow>,
}

impl<E: BranchElement> Walk<'_, E> {
    fn branch(&mut self, branch: &Branch, distance: u32, founding: bool) {
        let atom = self.founder.contemporary;
        for (revision, record) in branch.revisions().iter().rev() {
            if founding && E::end(&record.ring) <= atom.offset() {
                break;
            }
            let version = Version::new(branch.index(), revision);
            self.rows.push(EvolutionRow {
                distance,
                version,
                presence: self.presence(version),
                fork: !record.alternates.is_empty(),
            });
            for &alternate in &record.alternates {
                let tree = self.tree;
                match tree.get(alternate) {
                    Ok(alternate) => self.branch(alternate, distance + 1, false),
                    Err(error) => panic!("{version} lists a missing alternate: {error}"),
                }
            }
        }
    }

    fn presence(&self, version: Version) -> Presence {
        let fasces = match self.tree.fasces_through(version) {
            Ok(fasces) => fasces,
            Err(error) => panic!("committed {version} has no trunk: {error}"),
        };
        let metadata = E::metadata(self.histories)
            .value_in(fasces.segments::<E>(self.founder.contemporary, E::METADATA));
        match metadata {
            Some(Some(_)) => Presence::Extant,
            _ => Presence::Extinct,
        }
    }
}
