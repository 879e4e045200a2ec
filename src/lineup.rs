use crate::roster::ValuedPlayer;

pub const STARTER_SLOTS: usize = 5;

/// Position-balanced draft order: one center first, then two guards, then
/// two forwards. A player whose position string contains the slot letter is
/// eligible; combo positions ("G-F") qualify for both.
const DRAFT_ORDER: [(char, usize); 3] = [('C', 1), ('G', 2), ('F', 2)];

#[derive(Debug, Clone)]
pub struct Lineup {
    pub starters: Vec<ValuedPlayer>,
    pub bench: Vec<ValuedPlayer>,
}

/// Greedy best five over the available roster. Players are ranked by
/// contribution descending (stable, so ties keep their roster order), the
/// positional slots are filled from that ranking, and any unfilled slots
/// fall back to the best remaining players regardless of position.
pub fn select_best_lineup(available: &[ValuedPlayer]) -> Lineup {
    let mut ranked: Vec<usize> = (0..available.len()).collect();
    ranked.sort_by(|&a, &b| {
        available[b]
            .contribution
            .total_cmp(&available[a].contribution)
    });

    let mut selected = vec![false; available.len()];
    let mut starters: Vec<usize> = Vec::with_capacity(STARTER_SLOTS);

    for (slot_letter, want) in DRAFT_ORDER {
        let mut picked = 0usize;
        for &idx in &ranked {
            if picked >= want {
                break;
            }
            if selected[idx] || !available[idx].stat.position.contains(slot_letter) {
                continue;
            }
            selected[idx] = true;
            starters.push(idx);
            picked += 1;
        }
    }

    // Under-stocked positions: pad from the overall ranking.
    for &idx in &ranked {
        if starters.len() >= STARTER_SLOTS {
            break;
        }
        if !selected[idx] {
            selected[idx] = true;
            starters.push(idx);
        }
    }

    let bench = ranked
        .iter()
        .copied()
        .filter(|&idx| !selected[idx])
        .map(|idx| available[idx].clone())
        .collect();

    Lineup {
        starters: starters.into_iter().map(|idx| available[idx].clone()).collect(),
        bench,
    }
}
