//! Integration tests for the registry: CRUD, validation, and dangling references.

use tabletop_registry::{
    MatchFormat, MatchPatch, MatchResult, MatchStatus, MemoryStore, NewMatch, NewPlayer,
    NewTournament, PlayerPatch, Registry, RegistryError, RegistrySettings, TournamentFormat,
    TournamentPatch, TournamentStatus, BASELINE_RATING,
};

fn registry() -> Registry {
    Registry::open(MemoryStore::new(), RegistrySettings::default())
}

fn registry_with_players(names: &[&str]) -> (Registry, Vec<String>) {
    let mut r = registry();
    let ids = names
        .iter()
        .map(|n| r.add_player(NewPlayer::named(*n)).unwrap().id)
        .collect();
    (r, ids)
}

#[test]
fn add_player_assigns_id_and_baseline_rating() {
    let mut r = registry();
    let p = r.add_player(NewPlayer::named("  Ada  ")).unwrap();
    assert!(!p.id.is_empty());
    assert_eq!(p.name, "Ada");
    assert_eq!(p.rating, BASELINE_RATING);
    assert!(p.updated_at.is_none());
    assert_eq!(r.get_player_by_id(&p.id), Some(&p));
}

#[test]
fn player_ids_are_unique() {
    let (r, ids) = registry_with_players(&["A", "B", "C"]);
    assert_eq!(r.players().len(), 3);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}

#[test]
fn empty_name_is_rejected_without_change() {
    let (mut r, _) = registry_with_players(&["Ada"]);
    let before = r.players();
    assert_eq!(
        r.add_player(NewPlayer::named("")),
        Err(RegistryError::MissingField("name"))
    );
    assert_eq!(
        r.add_player(NewPlayer::named("   ")),
        Err(RegistryError::MissingField("name"))
    );
    assert_eq!(r.players(), before);
}

#[test]
fn update_player_merges_and_stamps() {
    let (mut r, ids) = registry_with_players(&["Ada"]);
    let updated = r
        .update_player(
            &ids[0],
            PlayerPatch {
                rating: Some(1800),
                ..PlayerPatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.rating, 1800);
    assert!(updated.updated_at.is_some());
}

#[test]
fn update_with_empty_or_unknown_id() {
    let mut r = registry();
    assert_eq!(
        r.update_player("", PlayerPatch::default()),
        Err(RegistryError::MissingField("id"))
    );
    assert_eq!(r.update_player("ghost", PlayerPatch::default()), Ok(None));
    assert_eq!(r.update_match("ghost", MatchPatch::default()), Ok(None));
    assert_eq!(
        r.update_tournament("ghost", TournamentPatch::default()),
        Ok(None)
    );
}

#[test]
fn removed_ids_look_up_as_none() {
    let (mut r, ids) = registry_with_players(&["A", "B"]);
    let m = r.add_match(NewMatch::between(&ids[0], &ids[1])).unwrap();
    let t = r
        .add_tournament(NewTournament::new("Cup", TournamentFormat::Swiss))
        .unwrap();
    assert!(r.remove_player(&ids[0]));
    assert!(r.remove_match(&m.id));
    assert!(r.remove_tournament(&t.id));
    assert!(r.get_player_by_id(&ids[0]).is_none());
    assert!(r.get_match_by_id(&m.id).is_none());
    assert!(r.get_tournament_by_id(&t.id).is_none());
    assert!(!r.remove_player(&ids[0]));
}

#[test]
fn add_match_defaults_and_resolves_names() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    let m = r.add_match(NewMatch::between(&ids[0], &ids[1])).unwrap();
    assert_eq!(m.status, MatchStatus::Scheduled);
    assert_eq!(m.format, MatchFormat::BestOf3);
    assert_eq!(m.max_rounds, 3);
    assert_eq!(m.player1.name, "Ada");
    assert_eq!(m.player2.name, "Grace");
}

#[test]
fn add_match_requires_two_distinct_players() {
    let (mut r, ids) = registry_with_players(&["Ada"]);
    assert_eq!(
        r.add_match(NewMatch::between("", &ids[0])),
        Err(RegistryError::MissingField("player1.id"))
    );
    assert_eq!(
        r.add_match(NewMatch::between(&ids[0], "")),
        Err(RegistryError::MissingField("player2.id"))
    );
    assert_eq!(
        r.add_match(NewMatch::between(&ids[0], &ids[0])),
        Err(RegistryError::SelfMatch)
    );
    assert!(r.matches().is_empty());
}

#[test]
fn recording_result_completes_match() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    let m = r
        .add_match(NewMatch::between(&ids[0], &ids[1]).with_format(MatchFormat::BestOf5))
        .unwrap();
    let done = r
        .record_match_result(&m.id, MatchResult::Player2)
        .unwrap()
        .unwrap();
    assert_eq!(done.status, MatchStatus::Completed);
    assert_eq!(done.result, Some(MatchResult::Player2));
    assert_eq!(done.required_wins(), 3);
}

#[test]
fn add_tournament_requires_name_and_format() {
    let mut r = registry();
    assert_eq!(
        r.add_tournament(NewTournament {
            name: "Cup".into(),
            ..NewTournament::default()
        }),
        Err(RegistryError::MissingField("format"))
    );
    assert_eq!(
        r.add_tournament(NewTournament::new(" ", TournamentFormat::Swiss)),
        Err(RegistryError::MissingField("name"))
    );
    let t = r
        .add_tournament(NewTournament::new("Cup", TournamentFormat::RoundRobin))
        .unwrap();
    assert!(t.players.is_empty());
    assert_eq!(t.status, TournamentStatus::Registration);
}

#[test]
fn roster_rejects_duplicates_and_unknown_players() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    assert_eq!(
        r.add_tournament(
            NewTournament::new("Cup", TournamentFormat::Swiss)
                .with_players(vec![ids[0].clone(), ids[0].clone()])
        ),
        Err(RegistryError::DuplicateParticipant(ids[0].clone()))
    );
    assert_eq!(
        r.add_tournament(
            NewTournament::new("Cup", TournamentFormat::Swiss).with_players(vec!["ghost".into()])
        ),
        Err(RegistryError::UnknownPlayer("ghost".into()))
    );
    let t = r
        .add_tournament(NewTournament::new("Cup", TournamentFormat::Swiss))
        .unwrap();
    r.add_participant(&t.id, &ids[0]).unwrap().unwrap();
    assert_eq!(
        r.add_participant(&t.id, &ids[0]),
        Err(RegistryError::DuplicateParticipant(ids[0].clone()))
    );
    let t = r.add_participant(&t.id, &ids[1]).unwrap().unwrap();
    assert_eq!(t.players, ids);
}

#[test]
fn only_registration_may_have_empty_roster() {
    let (mut r, ids) = registry_with_players(&["Ada"]);
    let t = r
        .add_tournament(NewTournament::new("Cup", TournamentFormat::Swiss))
        .unwrap();
    let activate = TournamentPatch {
        status: Some(TournamentStatus::Active),
        ..TournamentPatch::default()
    };
    assert_eq!(
        r.update_tournament(&t.id, activate.clone()),
        Err(RegistryError::EmptyActiveTournament)
    );
    r.add_participant(&t.id, &ids[0]).unwrap();
    let active = r.update_tournament(&t.id, activate).unwrap().unwrap();
    assert_eq!(active.status, TournamentStatus::Active);
    assert_eq!(
        r.remove_participant(&t.id, &ids[0]),
        Err(RegistryError::EmptyActiveTournament)
    );
}

#[test]
fn tournament_with_removed_player_stays_editable() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    let t = r
        .add_tournament(NewTournament::new("Cup", TournamentFormat::Swiss).with_players(ids.clone()))
        .unwrap();
    r.remove_player(&ids[0]);
    let renamed = r
        .update_tournament(
            &t.id,
            TournamentPatch {
                name: Some("Spring Cup".into()),
                ..TournamentPatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Spring Cup");
    assert_eq!(renamed.players, ids);
}

#[test]
fn snapshots_are_not_affected_by_later_mutations() {
    let (mut r, _) = registry_with_players(&["Ada"]);
    let snapshot = r.players();
    r.add_player(NewPlayer::named("Grace")).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(r.players().len(), 2);
}

#[test]
fn rating_for_uses_match_history() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    r.update_player(
        &ids[0],
        PlayerPatch {
            rating: Some(2000),
            ..PlayerPatch::default()
        },
    )
    .unwrap();
    assert_eq!(r.rating_for(&ids[0]), BASELINE_RATING);
    for _ in 0..100 {
        r.add_match(NewMatch::between(&ids[0], &ids[1])).unwrap();
    }
    assert_eq!(r.rating_for(&ids[0]), 1750);
    assert_eq!(r.rating_for(&ids[1]), BASELINE_RATING);
    assert_eq!(r.rating_for("ghost"), BASELINE_RATING);
}

#[test]
fn selection_ignores_removed_entities() {
    let (mut r, ids) = registry_with_players(&["Ada", "Grace"]);
    let m = r.add_match(NewMatch::between(&ids[0], &ids[1])).unwrap();
    r.select_match(Some(&m.id));
    assert_eq!(r.selected_match().map(|x| x.id.as_str()), Some(m.id.as_str()));
    r.remove_match(&m.id);
    assert!(r.selected_match().is_none());
    assert!(r.selected_tournament().is_none());
}
