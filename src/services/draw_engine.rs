use std::collections::HashSet;

use rand::Rng;

use crate::entities::participant_entity as participants;

/// Pick up to `number_of_winners` distinct users from the entry pool.
///
/// Partial Fisher-Yates over the entries: each step swaps a uniformly chosen
/// remaining entry into the next slot. An entry whose user has already won is
/// skipped, so a user with several entries holds several tickets but can win
/// once. Winners come back in draw order.
pub fn select_winners<R: Rng + ?Sized>(
    pool: &[participants::Model],
    number_of_winners: usize,
    rng: &mut R,
) -> Vec<participants::Model> {
    let mut tickets: Vec<&participants::Model> = pool.iter().collect();
    let mut won: HashSet<i64> = HashSet::new();
    let mut winners = Vec::new();

    let mut i = 0;
    while i < tickets.len() && winners.len() < number_of_winners {
        let j = rng.gen_range(i..tickets.len());
        tickets.swap(i, j);
        let ticket = tickets[i];
        if won.insert(ticket.user_id) {
            winners.push(ticket.clone());
        }
        i += 1;
    }

    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn entry(id: i64, user_id: i64) -> participants::Model {
        participants::Model {
            id,
            sweepstake_id: 1,
            user_id,
            name: format!("user-{user_id}"),
            avatar_url: None,
            entry_date: Utc::now(),
        }
    }

    fn pool(n: i64) -> Vec<participants::Model> {
        (1..=n).map(|i| entry(i, 100 + i)).collect()
    }

    #[test]
    fn test_winner_count_is_bounded_by_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = pool(10);
        assert_eq!(select_winners(&entries, 3, &mut rng).len(), 3);
        assert_eq!(select_winners(&entries, 10, &mut rng).len(), 10);
        assert!(select_winners(&entries, 0, &mut rng).is_empty());
        assert!(select_winners(&[], 4, &mut rng).is_empty());
    }

    #[test]
    fn test_winners_are_distinct_members_of_pool() {
        let entries = pool(25);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let winners = select_winners(&entries, 8, &mut rng);
            let users: HashSet<i64> = winners.iter().map(|w| w.user_id).collect();
            assert_eq!(users.len(), winners.len());
            assert!(winners.iter().all(|w| entries.contains(w)));
        }
    }

    #[test]
    fn test_more_winners_than_entries_selects_everyone() {
        let mut rng = StdRng::seed_from_u64(11);
        let entries = pool(3);
        let mut winners: Vec<i64> = select_winners(&entries, 5, &mut rng)
            .into_iter()
            .map(|w| w.user_id)
            .collect();
        winners.sort();
        assert_eq!(winners, vec![101, 102, 103]);
    }

    #[test]
    fn test_single_entry_always_wins() {
        let entries = pool(1);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let winners = select_winners(&entries, 1, &mut rng);
            assert_eq!(winners, entries);
        }
    }

    #[test]
    fn test_single_winner_is_uniform() {
        let entries = pool(3);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut wins: HashMap<i64, u32> = HashMap::new();
        let draws = 10_000;
        for _ in 0..draws {
            let winner = &select_winners(&entries, 1, &mut rng)[0];
            *wins.entry(winner.user_id).or_default() += 1;
        }
        assert_eq!(wins.len(), 3);
        // expected ~3333 each; 3000..3700 is far outside normal variance
        for count in wins.values() {
            assert!((3000..3700).contains(count), "skewed draw: {wins:?}");
        }
    }

    #[test]
    fn test_repeat_entries_win_once() {
        // user 1 holds three tickets, user 2 one
        let entries = vec![entry(1, 1), entry(2, 1), entry(3, 1), entry(4, 2)];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let winners = select_winners(&entries, 2, &mut rng);
            let mut users: Vec<i64> = winners.iter().map(|w| w.user_id).collect();
            users.sort();
            assert_eq!(users, vec![1, 2]);
        }
    }
}
