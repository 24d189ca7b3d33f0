//! Sync Protocol tests.
//!
//! Two sessions share a `MemoryRelay`. Most tests pump the relay by hand so
//! every delivery order is explicit; the driver tests run real room tasks
//! on a paused tokio clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use duel_arcade::core::{Choice, ConfigError, MovePayload, Player, SessionConfig, WireFormat};
use duel_arcade::rules::{Board, GameKind, GameRules, InvalidMove, MatchState, Rules, Verdict};
use duel_arcade::session::{MatchView, Notice, Phase, Presentation, SessionCoordinator, SessionError};
use duel_arcade::sync::{
    run_room, ChannelEvent, InboundOutcome, JsonCodec, LocalInput, MemoryPublisher, MemoryRelay, Role,
    RoomCode, SessionEnd, SyncError, SyncMessage, SyncSession, WireCodec,
};
use duel_arcade::Move;
use tokio::sync::mpsc::{self, UnboundedReceiver};

type Session = SyncSession<MemoryPublisher>;
type Events = UnboundedReceiver<ChannelEvent>;

/// Apply every queued channel event to `session`.
fn pump<R: Rules>(session: &mut SyncSession<MemoryPublisher, R>, events: &mut Events) -> Vec<InboundOutcome> {
    let mut outcomes = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            ChannelEvent::Message(payload) => outcomes.push(session.on_message(&payload).unwrap()),
            ChannelEvent::PeerCount(count) => session.on_peer_count(count),
        }
    }
    outcomes
}

struct Pair {
    relay: MemoryRelay,
    host: Session,
    host_rx: Events,
    joiner: Session,
    joiner_rx: Events,
}

fn pair_with(config: &SessionConfig) -> Pair {
    let relay = MemoryRelay::new();
    let (mut host, mut host_rx) = SyncSession::host(&relay, config).unwrap();
    let (mut joiner, mut joiner_rx) = SyncSession::join(&relay, host.room().code.clone(), config).unwrap();
    assert!(pump(&mut host, &mut host_rx).is_empty());
    assert!(pump(&mut joiner, &mut joiner_rx).is_empty());
    Pair {
        relay,
        host,
        host_rx,
        joiner,
        joiner_rx,
    }
}

fn pair(kind: GameKind) -> Pair {
    pair_with(&SessionConfig::for_game(kind).with_seed(1))
}

fn column(col: u8) -> MovePayload {
    MovePayload::Column(col)
}

fn state_message(room: &RoomCode, sender: Player, sequence: u64, state: MatchState) -> Vec<u8> {
    let message = SyncMessage::State {
        room: room.clone(),
        sender,
        sequence,
        epoch: 0,
        state,
        score: None,
    };
    JsonCodec.encode(&message).unwrap()
}

/// Take the queued payloads without applying them.
fn payloads(events: &mut Events) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ChannelEvent::Message(payload) = event {
            out.push(payload);
        }
    }
    out
}

/// Tic-Tac-Toe on cells 0, 1, 2 for the host against 3, 4.
fn play_host_win(host: &mut Session, host_rx: &mut Events, joiner: &mut Session, joiner_rx: &mut Events) {
    for (i, cell) in [0, 3, 1, 4, 2].into_iter().enumerate() {
        if i % 2 == 0 {
            host.submit_local(MovePayload::Cell(cell)).unwrap();
            pump(joiner, joiner_rx);
        } else {
            joiner.submit_local(MovePayload::Cell(cell)).unwrap();
            pump(host, host_rx);
        }
    }
    assert_eq!(host.coordinator().state().verdict, Verdict::Win(Player::One));
    assert_eq!(joiner.coordinator().phase(), Phase::Terminal);
}

/// Both peers unlock once the relay reports two subscribers.
#[test]
fn test_join_unlocks_both_sides() {
    let config = SessionConfig::for_game(GameKind::TicTacToe);
    let relay = MemoryRelay::new();
    let (mut host, mut host_rx) = SyncSession::host(&relay, &config).unwrap();
    pump(&mut host, &mut host_rx);

    assert_eq!(host.room().local_role, Role::Host);
    assert!(matches!(
        host.submit_local(MovePayload::Cell(4)),
        Err(SyncError::Session(SessionError::PeerUnavailable))
    ));

    let code = RoomCode::parse(host.room().code.as_str()).unwrap();
    let (mut joiner, mut joiner_rx) = SyncSession::join(&relay, code, &config).unwrap();
    pump(&mut host, &mut host_rx);
    pump(&mut joiner, &mut joiner_rx);

    assert!(host.room().is_full() && joiner.room().is_full());
    assert_eq!(joiner.room().local_player(), Player::Two);
    assert_eq!(
        joiner.coordinator().mode(),
        Some(duel_arcade::session::Mode::Networked { local_role: Player::Two })
    );
    assert!(host.submit_local(MovePayload::Cell(4)).is_ok());
}

/// Out-of-order delivery of 3, 1, 2 leaves exactly state 3.
#[test]
fn test_out_of_order_keeps_latest() {
    let Pair { mut host, .. } = pair(GameKind::TicTacToe);
    let rules = GameRules::new(GameKind::TicTacToe);
    let code = host.room().code.clone();

    let mut states = Vec::new();
    let mut state = rules.initial_state();
    for (player, cell) in [(Player::One, 0), (Player::Two, 4), (Player::One, 8)] {
        state = rules
            .apply_move(&state, &Move::new(player, MovePayload::Cell(cell), 0))
            .unwrap();
        states.push(state.clone());
    }

    let outcomes: Vec<_> = [3u64, 1, 2]
        .into_iter()
        .map(|seq| {
            let payload = state_message(&code, Player::Two, seq, states[seq as usize - 1].clone());
            host.on_message(&payload).unwrap()
        })
        .collect();

    assert_eq!(
        outcomes,
        vec![InboundOutcome::Accepted, InboundOutcome::Stale, InboundOutcome::Stale]
    );
    assert_eq!(host.coordinator().state(), &states[2]);
    assert_eq!(host.room().last_seen_sequence, 3);
    assert!(host.coordinator().sequence() >= 3);
}

/// Echoes, other rooms, foreign games and garbage are all ignored.
#[test]
fn test_misaddressed_messages_ignored() {
    let Pair { mut host, .. } = pair(GameKind::TicTacToe);
    let code = host.room().code.clone();
    let fresh = GameRules::new(GameKind::TicTacToe).initial_state();

    let echo = state_message(&code, Player::One, 5, fresh.clone());
    let elsewhere = state_message(&RoomCode::parse("OtherRoom1").unwrap(), Player::Two, 5, fresh);
    let wrong_game = state_message(
        &code,
        Player::Two,
        5,
        GameRules::new(GameKind::ConnectFour).initial_state(),
    );

    for payload in [echo, elsewhere, wrong_game, b"{not json".to_vec()] {
        assert_eq!(host.on_message(&payload).unwrap(), InboundOutcome::Ignored);
    }
    assert_eq!(host.room().last_seen_sequence, 0);
}

/// Moves alternate between peers and the host's score reaches the joiner.
#[test]
fn test_turn_based_match_syncs_state_and_score() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::ConnectFour);

    for (i, col) in [0, 1, 0, 1, 0, 1, 0].into_iter().enumerate() {
        if i % 2 == 0 {
            host.submit_local(column(col)).unwrap();
            assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
        } else {
            assert!(matches!(
                host.submit_local(column(col)),
                Err(SyncError::Session(SessionError::OutOfTurn))
            ));
            joiner.submit_local(column(col)).unwrap();
            assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Accepted]);
        }
        assert_eq!(host.coordinator().state(), joiner.coordinator().state());
    }

    assert_eq!(host.coordinator().state().verdict, Verdict::Win(Player::One));
    assert_eq!(host.coordinator().score().wins(Player::One), 1);
    assert_eq!(joiner.coordinator().score().wins(Player::One), 1);
    assert_eq!(joiner.coordinator().phase(), Phase::Terminal);
}

/// A joiner win is scored by the host, then the score is sent back.
#[test]
fn test_joiner_win_scored_by_host() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::ConnectFour);

    for (i, col) in [0, 1, 0, 1, 2, 1, 2, 1].into_iter().enumerate() {
        if i % 2 == 0 {
            host.submit_local(column(col)).unwrap();
            pump(&mut joiner, &mut joiner_rx);
        } else {
            joiner.submit_local(column(col)).unwrap();
            pump(&mut host, &mut host_rx);
        }
    }

    assert_eq!(host.coordinator().state().verdict, Verdict::Win(Player::Two));
    assert_eq!(host.coordinator().score().wins(Player::Two), 1);
    assert_eq!(joiner.coordinator().score().wins(Player::Two), 0);

    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    assert_eq!(joiner.coordinator().score().wins(Player::Two), 1);
    assert_eq!(host.coordinator().state(), joiner.coordinator().state());
}

/// Only the host resets; a reset claiming to come from the joiner is dropped.
#[test]
fn test_reset_is_host_only() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::TicTacToe);
    host.submit_local(MovePayload::Cell(4)).unwrap();
    pump(&mut joiner, &mut joiner_rx);

    assert!(matches!(
        joiner.reset(),
        Err(SyncError::Session(SessionError::NotHost))
    ));

    let forged = JsonCodec
        .encode(&SyncMessage::Reset {
            room: host.room().code.clone(),
            sender: Player::Two,
            sequence: 99,
            epoch: 0,
        })
        .unwrap();
    assert_eq!(host.on_message(&forged).unwrap(), InboundOutcome::Ignored);
    assert_eq!(host.coordinator().history().len(), 1);

    host.reset().unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    let fresh = GameRules::new(GameKind::TicTacToe).initial_state();
    assert_eq!(joiner.coordinator().state(), &fresh);
    assert_eq!(host.coordinator().state(), &fresh);
    assert!(pump(&mut host, &mut host_rx).is_empty());
}

/// A joiner move still in flight when the host resets is dropped, and
/// both sides carry on from the same fresh board.
#[test]
fn test_reset_drops_move_sent_before_it() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::TicTacToe);
    host.submit_local(MovePayload::Cell(0)).unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);

    joiner.submit_local(MovePayload::Cell(4)).unwrap();
    host.reset().unwrap();

    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Stale]);
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    let fresh = GameRules::new(GameKind::TicTacToe).initial_state();
    assert_eq!(host.coordinator().state(), &fresh);
    assert_eq!(joiner.coordinator().state(), &fresh);

    host.submit_local(MovePayload::Cell(8)).unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    joiner.submit_local(MovePayload::Cell(4)).unwrap();
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Accepted]);
    assert_eq!(host.coordinator().state(), joiner.coordinator().state());
}

/// A joiner that hears the host's first move after a reset before the
/// reset itself still leaves the decided board, and the late reset is stale.
#[test]
fn test_post_reset_move_overtakes_reset() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::TicTacToe);
    play_host_win(&mut host, &mut host_rx, &mut joiner, &mut joiner_rx);

    host.reset().unwrap();
    host.submit_local(MovePayload::Cell(4)).unwrap();

    let mut queued = payloads(&mut joiner_rx);
    assert_eq!(queued.len(), 2);
    queued.reverse();
    let outcomes: Vec<_> = queued.iter().map(|p| joiner.on_message(p).unwrap()).collect();

    assert_eq!(outcomes, vec![InboundOutcome::Accepted, InboundOutcome::Stale]);
    assert_eq!(joiner.coordinator().phase(), Phase::InProgress);
    assert_eq!(joiner.coordinator().state(), host.coordinator().state());
    joiner.submit_local(MovePayload::Cell(0)).unwrap();
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Accepted]);
}

/// A Rock-Paper-Scissors choice made before the host reset never carries
/// into the next round.
#[test]
fn test_reset_discards_rps_choice_in_flight() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::RockPaperScissors);

    joiner.submit_local(MovePayload::Choice(Choice::Scissors)).unwrap();
    host.reset().unwrap();
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Stale]);
    assert!(!host.has_sealed_choice());
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    assert_eq!(rps_choice(joiner.coordinator().state(), Player::Two), None);

    host.submit_local(MovePayload::Choice(Choice::Rock)).unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Sealed]);
    joiner.submit_local(MovePayload::Choice(Choice::Paper)).unwrap();
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Revealed]);
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Revealed]);

    for side in [&host, &joiner] {
        assert_eq!(side.coordinator().state().verdict, Verdict::Win(Player::Two));
        assert_eq!(rps_choice(side.coordinator().state(), Player::Two), Some(Choice::Paper));
    }
    assert_eq!(host.coordinator().score().wins(Player::One), 0);
    assert_eq!(host.coordinator().score().wins(Player::Two), 1);
}

/// A decided board ignores in-progress states from either side; only the
/// host's reset reopens it.
#[test]
fn test_decided_board_stays_frozen() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::TicTacToe);
    play_host_win(&mut host, &mut host_rx, &mut joiner, &mut joiner_rx);

    let code = host.room().code.clone();
    let rules = GameRules::new(GameKind::TicTacToe);
    let one_mark = rules
        .apply_move(&rules.initial_state(), &Move::new(Player::One, MovePayload::Cell(4), 0))
        .unwrap();

    let forged = state_message(&code, Player::Two, 50, one_mark.clone());
    assert_eq!(host.on_message(&forged).unwrap(), InboundOutcome::Ignored);
    assert_eq!(host.coordinator().phase(), Phase::Terminal);

    let forged = state_message(&code, Player::One, 50, one_mark);
    assert_eq!(joiner.on_message(&forged).unwrap(), InboundOutcome::Ignored);
    assert_eq!(joiner.coordinator().phase(), Phase::Terminal);

    host.reset().unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
    assert_eq!(joiner.coordinator().phase(), Phase::InProgress);
    assert_eq!(host.coordinator().score().wins(Player::One), 1);
}

/// A config that fails validation is refused before subscribing.
#[test]
fn test_invalid_config_refused() {
    let relay = MemoryRelay::new();
    let config = SessionConfig::for_game(GameKind::DotsAndBoxes).with_dots(0, 0);
    assert!(matches!(
        SyncSession::host(&relay, &config),
        Err(SyncError::Config(ConfigError::DotsGrid { .. }))
    ));
}

/// Losing the peer freezes input without forfeiting the match.
#[test]
fn test_disconnect_freezes_input() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        ..
    } = pair(GameKind::ConnectFour);
    host.submit_local(column(3)).unwrap();

    joiner.leave().unwrap();
    pump(&mut host, &mut host_rx);
    assert_eq!(host.room().peer_count, 1);
    assert!(matches!(
        host.submit_local(column(3)),
        Err(SyncError::Session(SessionError::PeerUnavailable))
    ));
    assert_eq!(host.coordinator().phase(), Phase::InProgress);
    assert_eq!(host.coordinator().state().verdict, Verdict::InProgress);
}

/// Bincode carries a whole match just like JSON.
#[test]
fn test_bincode_wire_format() {
    let config = SessionConfig::for_game(GameKind::DotsAndBoxes).with_wire_format(WireFormat::Bincode);
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair_with(&config);

    while !host.coordinator().state().is_terminal() {
        let state = host.coordinator().state().clone();
        let rules = host.coordinator().rules();
        let payload = rules.legal_moves(&state, state.active_player)[0];
        if state.active_player == Player::One {
            host.submit_local(payload).unwrap();
            assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Accepted]);
        } else {
            joiner.submit_local(payload).unwrap();
            pump(&mut host, &mut host_rx);
            pump(&mut joiner, &mut joiner_rx);
        }
    }
    assert_eq!(host.coordinator().state(), joiner.coordinator().state());
}

#[derive(Clone, Default)]
struct Seen {
    states: Arc<Mutex<Vec<MatchState>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl Presentation for Seen {
    fn render(&mut self, view: &MatchView<'_>) {
        self.states.lock().unwrap().push(view.state.clone());
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn rps_choice(state: &MatchState, player: Player) -> Option<Choice> {
    match &state.board {
        Board::RockPaperScissors(slots) => slots.choice(player),
        _ => None,
    }
}

/// Host rock, joiner scissors. Nothing resolves until both
/// choices are in, and both sides end on "host wins".
#[test]
fn test_networked_rps_reveal() {
    let Pair {
        relay,
        mut host,
        mut host_rx,
        ..
    } = pair(GameKind::RockPaperScissors);
    // Swap in a joiner whose presentation is recorded. The pair's joiner
    // was dropped without leaving, which frees its seat.
    let seen = Seen::default();
    let coordinator =
        SessionCoordinator::new(GameRules::new(GameKind::RockPaperScissors)).with_presentation(seen.clone());
    let (mut joiner, mut joiner_rx) = SyncSession::open(
        &relay,
        host.room().code.clone(),
        Role::Joiner,
        coordinator,
        Box::new(JsonCodec),
    )
    .unwrap();
    pump(&mut host, &mut host_rx);
    pump(&mut joiner, &mut joiner_rx);

    host.submit_local(MovePayload::Choice(Choice::Rock)).unwrap();
    assert_eq!(host.coordinator().state().verdict, Verdict::InProgress);

    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Sealed]);
    assert!(joiner.has_sealed_choice());
    assert_eq!(rps_choice(joiner.coordinator().state(), Player::One), None);

    joiner.submit_local(MovePayload::Choice(Choice::Scissors)).unwrap();
    assert_eq!(joiner.coordinator().state().verdict, Verdict::InProgress);

    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Revealed]);
    assert_eq!(host.coordinator().state().verdict, Verdict::Win(Player::One));

    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Revealed]);
    assert_eq!(joiner.coordinator().state().verdict, Verdict::Win(Player::One));
    assert_eq!(host.coordinator().state(), joiner.coordinator().state());
    assert_eq!(joiner.coordinator().score().wins(Player::One), 1);

    let states = seen.states.lock().unwrap();
    let (last, earlier) = states.split_last().unwrap();
    assert!(earlier.iter().all(|s| rps_choice(s, Player::One).is_none()));
    assert_eq!(rps_choice(last, Player::One), Some(Choice::Rock));
    assert!(seen.notices.lock().unwrap().contains(&Notice::RoundRevealed));
}

/// Both peers commit before either hears from the other.
#[test]
fn test_concurrent_rps_commits() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::RockPaperScissors);

    host.submit_local(MovePayload::Choice(Choice::Paper)).unwrap();
    joiner.submit_local(MovePayload::Choice(Choice::Scissors)).unwrap();

    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Sealed]);
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Revealed]);
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Revealed]);

    for side in [&host, &joiner] {
        assert_eq!(side.coordinator().state().verdict, Verdict::Win(Player::Two));
    }
    assert_eq!(host.coordinator().score().wins(Player::Two), 1);
}

/// A host that chose second still reveals at once.
#[test]
fn test_joiner_commits_first() {
    let Pair {
        mut host,
        mut host_rx,
        mut joiner,
        mut joiner_rx,
        ..
    } = pair(GameKind::RockPaperScissors);

    joiner.submit_local(MovePayload::Choice(Choice::Rock)).unwrap();
    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Sealed]);
    assert_eq!(rps_choice(host.coordinator().state(), Player::Two), None);

    host.submit_local(MovePayload::Choice(Choice::Rock)).unwrap();
    assert_eq!(host.coordinator().state().verdict, Verdict::Draw);
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Revealed]);
    assert_eq!(joiner.coordinator().state().verdict, Verdict::Draw);
}

/// A room task gives up when nobody joins within the wait.
#[tokio::test(start_paused = true)]
async fn test_room_task_times_out_alone() {
    let relay = MemoryRelay::new();
    let config = SessionConfig::for_game(GameKind::TicTacToe).with_peer_wait_timeout(Duration::from_secs(30));
    let (mut host, mut events) = SyncSession::host(&relay, &config).unwrap();
    let (_inputs_tx, mut inputs) = mpsc::unbounded_channel();

    let end = run_room(&mut host, &mut events, &mut inputs).await;
    assert_eq!(end, SessionEnd::TimedOut);
    assert_eq!(relay.peer_count(&host.room().code), 0);
}

/// Two room tasks play a full round and leave on request.
#[tokio::test(start_paused = true)]
async fn test_room_tasks_play_round() {
    let config = SessionConfig::for_game(GameKind::RockPaperScissors).with_peer_wait_timeout(Duration::from_secs(5));
    let relay = MemoryRelay::new();
    let (mut host, mut host_events) = SyncSession::host(&relay, &config).unwrap();
    let (mut joiner, mut joiner_events) = SyncSession::join(&relay, host.room().code.clone(), &config).unwrap();
    pump(&mut host, &mut host_events);
    pump(&mut joiner, &mut joiner_events);

    let (host_input, mut host_inputs) = mpsc::unbounded_channel();
    let (joiner_input, mut joiner_inputs) = mpsc::unbounded_channel();
    let host_task = tokio::spawn(async move {
        let end = run_room(&mut host, &mut host_events, &mut host_inputs).await;
        (host, end)
    });
    let joiner_task = tokio::spawn(async move {
        let end = run_room(&mut joiner, &mut joiner_events, &mut joiner_inputs).await;
        (joiner, end)
    });

    host_input.send(LocalInput::Move(MovePayload::Choice(Choice::Rock))).unwrap();
    joiner_input.send(LocalInput::Move(MovePayload::Choice(Choice::Scissors))).unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!host_task.is_finished());

    host_input.send(LocalInput::Leave).unwrap();
    joiner_input.send(LocalInput::Leave).unwrap();
    let (host, host_end) = host_task.await.unwrap();
    let (joiner, joiner_end) = joiner_task.await.unwrap();

    assert_eq!((host_end, joiner_end), (SessionEnd::Left, SessionEnd::Left));
    assert_eq!(host.coordinator().state().verdict, Verdict::Win(Player::One));
    assert_eq!(joiner.coordinator().state().verdict, Verdict::Win(Player::One));
    assert_eq!(joiner.coordinator().score().wins(Player::One), 1);
}

/// Standard rules, except the second seat can never commit.
struct SecondSeatLocked(GameRules);

impl Rules for SecondSeatLocked {
    fn kind(&self) -> GameKind {
        self.0.kind()
    }

    fn initial_state(&self) -> MatchState {
        self.0.initial_state()
    }

    fn legal_moves(&self, state: &MatchState, player: Player) -> Vec<MovePayload> {
        self.0.legal_moves(state, player)
    }

    fn apply_move(&self, state: &MatchState, mv: &Move) -> Result<MatchState, InvalidMove> {
        if mv.player == Player::Two {
            return Err(InvalidMove::ChoiceLocked(Player::Two));
        }
        self.0.apply_move(state, mv)
    }

    fn verdict(&self, state: &MatchState) -> Verdict {
        self.0.verdict(state)
    }

    fn accepts(&self, state: &MatchState) -> bool {
        self.0.accepts(state)
    }
}

/// A peer choice the host cannot merge is ignored, not announced.
#[test]
fn test_unmergeable_choice_ignored() {
    let relay = MemoryRelay::new();
    let code = RoomCode::parse("MergeTest1").unwrap();
    let coordinator = SessionCoordinator::new(SecondSeatLocked(GameRules::new(GameKind::RockPaperScissors)));
    let (mut host, mut host_rx) =
        SyncSession::open(&relay, code.clone(), Role::Host, coordinator, Box::new(JsonCodec)).unwrap();
    let config = SessionConfig::for_game(GameKind::RockPaperScissors);
    let (mut joiner, mut joiner_rx) = SyncSession::join(&relay, code, &config).unwrap();
    pump(&mut host, &mut host_rx);
    pump(&mut joiner, &mut joiner_rx);

    host.submit_local(MovePayload::Choice(Choice::Rock)).unwrap();
    assert_eq!(pump(&mut joiner, &mut joiner_rx), vec![InboundOutcome::Sealed]);
    joiner.submit_local(MovePayload::Choice(Choice::Scissors)).unwrap();

    assert_eq!(pump(&mut host, &mut host_rx), vec![InboundOutcome::Ignored]);
    assert_eq!(host.coordinator().state().verdict, Verdict::InProgress);
    assert_eq!(rps_choice(host.coordinator().state(), Player::Two), None);
    assert!(pump(&mut joiner, &mut joiner_rx).is_empty());
}
