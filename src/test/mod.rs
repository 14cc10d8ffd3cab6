mod recovery;
mod stepper;

use crate::model::{NetworkBuilder, ReactionDef, ReactionNetwork};

/// A → ∅ with rate `k` and `initial` copies of A.
pub(crate) fn decay_network(initial: i64, k: f64) -> ReactionNetwork {
    NetworkBuilder::new()
        .species("A", initial)
        .parameter("k", k)
        .reaction(ReactionDef::new("decay", "k").reactant("A", 1))
        .build()
        .expect("decay network")
}

/// 2A → B with rate `k`.
pub(crate) fn dimer_network(initial: i64, k: f64) -> ReactionNetwork {
    NetworkBuilder::new()
        .species("A", initial)
        .species("B", 0)
        .parameter("k", k)
        .reaction(
            ReactionDef::new("dimerize", "k")
                .reactant("A", 2)
                .product("B", 1),
        )
        .build()
        .expect("dimer network")
}

/// ∅ → X at rate `birth`, X → ∅ at rate `death`, starting from X = 0.
pub(crate) fn birth_death_network(birth: f64, death: f64) -> ReactionNetwork {
    NetworkBuilder::new()
        .species("X", 0)
        .parameter("k_birth", birth)
        .parameter("k_death", death)
        .reaction(ReactionDef::new("birth", "k_birth").product("X", 1))
        .reaction(ReactionDef::new("death", "k_death").reactant("X", 1))
        .build()
        .expect("birth-death network")
}
