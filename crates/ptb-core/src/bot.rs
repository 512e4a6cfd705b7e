//! Conversation state machine.
//!
//! [`transition`] is a pure table from (state, input) to a [`Transition`];
//! [`PlaceBot`] applies it against the stores and the notifier. Each update is
//! handled at most once and never retried.

use std::sync::Arc;

use crate::{
    domain::{GeoPoint, UserId},
    messaging::{
        port::Notifier,
        types::{is_reserved_token, Action, ActionSet, Command, IncomingUpdate, UpdateKind},
    },
    nearby::within_radius,
    place::{is_storable_field, SEPARATOR},
    places::PlaceRepository,
    session::{SessionState, SessionStore},
    store::Store,
    Result,
};

const HELP_LINES: [&str; 4] = [
    "/add - save a new place (photo, location and name)",
    "/list - show the most recent places",
    "/nearby - find saved places around you",
    "/reset - delete all saved places",
];

/// What one input does in one state.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    StartAdding,
    SetDraftLocation(GeoPoint),
    SetDraftName(String),
    SetDraftPhoto(String),
    RejectName,
    CommitDraft,
    PreviewDraft,
    CancelAdding,
    FinishAddingFirst,
    StartSearch,
    SetRadius(u64),
    RejectRadius,
    Search(GeoPoint),
    CancelSearch,
    FinishSearchFirst,
    List,
    Reset,
    Help,
    UnknownCommand(String),
    Ignore,
}

/// The transition table.
pub fn transition(state: SessionState, input: &UpdateKind) -> Transition {
    use SessionState::*;

    // Global commands first.
    if let UpdateKind::Command(cmd) = input {
        match cmd {
            Command::Reset => return Transition::Reset,
            Command::Start | Command::Help => return Transition::Help,
            Command::Unknown(name) => return Transition::UnknownCommand(name.clone()),
            Command::Add | Command::List | Command::Nearby => {}
        }
    }

    match (state, input) {
        (Idle, UpdateKind::Command(Command::Add)) => Transition::StartAdding,
        (Idle, UpdateKind::Command(Command::Nearby)) => Transition::StartSearch,
        (Idle, UpdateKind::Command(Command::List)) => Transition::List,
        (Idle, _) => Transition::Ignore,

        (Adding, UpdateKind::Command(_)) => Transition::FinishAddingFirst,
        (Adding, UpdateKind::Location(p)) => Transition::SetDraftLocation(*p),
        (Adding, UpdateKind::Text(text)) if is_reserved_token(text) => {
            Transition::FinishAddingFirst
        }
        (Adding, UpdateKind::Text(text)) if !is_storable_field(text) => Transition::RejectName,
        (Adding, UpdateKind::Text(text)) => Transition::SetDraftName(text.clone()),
        (Adding, UpdateKind::Photo(photo)) => Transition::SetDraftPhoto(photo.clone()),
        (Adding, UpdateKind::Action(label)) => match Action::from_label(label) {
            Some(Action::CommitPlace) => Transition::CommitDraft,
            Some(Action::PreviewDraft) => Transition::PreviewDraft,
            Some(Action::CancelAdding) => Transition::CancelAdding,
            Some(Action::CancelSearch) | None => Transition::Ignore,
        },

        (SearchingNearby, UpdateKind::Command(_)) => Transition::FinishSearchFirst,
        (SearchingNearby, UpdateKind::Text(text)) => match parse_radius(text) {
            Some(meters) => Transition::SetRadius(meters),
            None => Transition::RejectRadius,
        },
        (SearchingNearby, UpdateKind::Location(p)) => Transition::Search(*p),
        (SearchingNearby, UpdateKind::Action(label)) => match Action::from_label(label) {
            Some(Action::CancelSearch) => Transition::CancelSearch,
            _ => Transition::Ignore,
        },
        (SearchingNearby, UpdateKind::Photo(_)) => Transition::Ignore,
    }
}

/// Radius in whole meters; anything but plain digits is rejected.
fn parse_radius(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok()
}

pub struct PlaceBot {
    sessions: SessionStore,
    places: PlaceRepository,
    notifier: Arc<dyn Notifier>,
    list_limit: usize,
}

impl PlaceBot {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        notifier: Arc<dyn Notifier>,
        list_limit: usize,
    ) -> Self {
        Self {
            sessions: SessionStore::new(store.clone()),
            places: PlaceRepository::new(store),
            notifier,
            list_limit,
        }
    }

    /// Process one inbound update to completion.
    ///
    /// Store and notifier failures are returned to the caller; recoverable
    /// input problems are answered with a message instead.
    pub async fn handle(&self, update: &IncomingUpdate) -> Result<Transition> {
        let user = update.user_id;
        let state = self.sessions.state(user).await?;
        let step = transition(state, &update.kind);

        if step == Transition::Ignore {
            tracing::debug!(%user, %state, kind = ?update.kind, "ignoring update");
            return Ok(step);
        }
        tracing::info!(%user, %state, transition = ?step, "handling update");

        self.apply(user, &step).await?;
        Ok(step)
    }

    async fn apply(&self, user: UserId, step: &Transition) -> Result<()> {
        let n = &self.notifier;
        match step {
            Transition::StartAdding => {
                self.sessions.set_state(user, SessionState::Adding).await?;
                n.send_text(
                    user,
                    "Send a photo, the location and the name of the place, in any order.",
                    Some(&ActionSet::new(vec![Action::CancelAdding])),
                )
                .await
            }
            Transition::SetDraftLocation(point) => {
                self.sessions.set_draft_location(user, *point).await?;
                n.send_text(user, "Location updated.", Some(&ActionSet::draft_menu()))
                    .await
            }
            Transition::SetDraftName(name) => {
                self.sessions.set_draft_name(user, name).await?;
                n.send_text(user, "Name updated.", Some(&ActionSet::draft_menu()))
                    .await
            }
            Transition::SetDraftPhoto(photo) => {
                self.sessions.set_draft_photo(user, photo).await?;
                n.send_text(user, "Photo updated.", Some(&ActionSet::draft_menu()))
                    .await
            }
            Transition::RejectName => {
                let msg = format!("A place name cannot contain '{SEPARATOR}'. Send another name.");
                n.send_text(user, &msg, None).await
            }
            Transition::CommitDraft => {
                let place = self.sessions.draft(user).await?.into_place();
                self.places.commit(user, &place).await?;
                self.sessions.clear_draft(user).await?;
                self.sessions.set_state(user, SessionState::Idle).await?;
                tracing::info!(%user, name = %place.name, "place saved");
                n.send_text(user, "Place saved.", None).await
            }
            Transition::PreviewDraft => {
                let draft = self.sessions.draft(user).await?;
                if draft.is_empty() {
                    return n
                        .send_text(user, "Nothing added yet.", Some(&ActionSet::draft_menu()))
                        .await;
                }
                let location = draft.location;
                let place = draft.into_place();
                self.render_place(user, &place.photo, &place.name, location)
                    .await
            }
            Transition::CancelAdding => {
                self.sessions.clear_draft(user).await?;
                self.sessions.set_state(user, SessionState::Idle).await?;
                n.send_text(user, "Adding cancelled.", None).await
            }
            Transition::FinishAddingFirst => {
                n.send_text(
                    user,
                    "Finish adding the current place first, or cancel it.",
                    Some(&ActionSet::draft_menu()),
                )
                .await
            }
            Transition::StartSearch => {
                self.sessions.clear_radius(user).await?;
                self.sessions
                    .set_state(user, SessionState::SearchingNearby)
                    .await?;
                n.send_text(user, "Send the search radius in meters.", None)
                    .await?;
                n.send_text(
                    user,
                    "Then share your location to see the places saved nearby.",
                    Some(&ActionSet::new(vec![Action::CancelSearch])),
                )
                .await
            }
            Transition::SetRadius(meters) => {
                self.sessions.set_radius(user, *meters).await?;
                n.send_text(
                    user,
                    "Now share your location.",
                    Some(&ActionSet::new(vec![Action::CancelSearch])),
                )
                .await
            }
            Transition::RejectRadius => {
                n.send_text(user, "Send the radius as a whole number of meters.", None)
                    .await
            }
            Transition::Search(anchor) => self.search(user, *anchor).await,
            Transition::CancelSearch => {
                self.sessions.clear_radius(user).await?;
                self.sessions.set_state(user, SessionState::Idle).await?;
                n.send_text(user, "Search cancelled.", None).await
            }
            Transition::FinishSearchFirst => {
                n.send_text(
                    user,
                    "Finish the current search first: send a radius and your location, or cancel it.",
                    Some(&ActionSet::new(vec![Action::CancelSearch])),
                )
                .await
            }
            Transition::List => self.list(user).await,
            Transition::Reset => {
                self.places.reset(user).await?;
                tracing::info!(%user, "places reset");
                n.send_text(user, "All places deleted.", None).await
            }
            Transition::Help => n.send_text(user, &HELP_LINES.join("\n"), None).await,
            Transition::UnknownCommand(name) => {
                let msg = format!("Unknown command: /{name}. Send /help for the list of commands.");
                n.send_text(user, &msg, None).await
            }
            Transition::Ignore => Ok(()),
        }
    }

    async fn search(&self, user: UserId, anchor: GeoPoint) -> Result<()> {
        let Some(radius) = self.sessions.radius(user).await? else {
            return self
                .notifier
                .send_text(
                    user,
                    "Send the search radius in meters first.",
                    Some(&ActionSet::new(vec![Action::CancelSearch])),
                )
                .await;
        };

        let places = self.places.all(user).await?;
        let hits: Vec<_> = within_radius(anchor, radius as f64, places).collect();

        self.sessions.clear_radius(user).await?;
        self.sessions.set_state(user, SessionState::Idle).await?;
        tracing::info!(%user, radius, hits = hits.len(), "nearby search");

        if hits.is_empty() {
            let msg = format!("No saved places within {radius} m.");
            return self.notifier.send_text(user, &msg, None).await;
        }
        for hit in hits {
            let name = display_name(&hit.place.name);
            self.notifier.send_text(user, name, None).await?;
            self.notifier.send_location(user, hit.location).await?;
        }
        Ok(())
    }

    async fn list(&self, user: UserId) -> Result<()> {
        let places = self.places.recent(user, self.list_limit).await?;
        if places.is_empty() {
            return self
                .notifier
                .send_text(user, "No places saved yet.", None)
                .await;
        }
        for place in places {
            self.render_place(user, &place.photo, &place.name, place.location)
                .await?;
        }
        Ok(())
    }

    /// Photo with caption (or the name alone), then the location if known.
    async fn render_place(
        &self,
        user: UserId,
        photo: &str,
        name: &str,
        location: Option<GeoPoint>,
    ) -> Result<()> {
        let caption = format!("Place: {}", display_name(name));
        if !photo.is_empty() {
            self.notifier.send_photo(user, photo, &caption).await?;
        } else if !name.is_empty() || location.is_none() {
            self.notifier.send_text(user, &caption, None).await?;
        }
        if let Some(point) = location {
            self.notifier.send_location(user, point).await?;
        }
        Ok(())
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        place::Place,
        store::{memory::MemoryStore, KeyValueStore, ListStore},
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    enum Sent {
        Text(String, Option<Vec<&'static str>>),
        Photo(String, String),
        Location(GeoPoint),
    }

    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<Sent>>,
    }

    impl FakeNotifier {
        fn take(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send_text(
            &self,
            _user: UserId,
            text: &str,
            actions: Option<&ActionSet>,
        ) -> Result<()> {
            let labels = actions.map(|a| a.labels().collect());
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Text(text.to_string(), labels));
            Ok(())
        }

        async fn send_photo(&self, _user: UserId, photo: &str, caption: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Photo(photo.to_string(), caption.to_string()));
            Ok(())
        }

        async fn send_location(&self, _user: UserId, point: GeoPoint) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Location(point));
            Ok(())
        }
    }

    const USER: UserId = UserId(100);

    struct Harness {
        store: Arc<MemoryStore>,
        notifier: Arc<FakeNotifier>,
        bot: PlaceBot,
    }

    impl Harness {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let notifier = Arc::new(FakeNotifier::default());
            let bot = PlaceBot::new(store.clone(), notifier.clone(), 11);
            Self {
                store,
                notifier,
                bot,
            }
        }

        async fn send(&self, kind: UpdateKind) -> Transition {
            self.bot
                .handle(&IncomingUpdate::new(USER, kind))
                .await
                .unwrap()
        }

        async fn command(&self, cmd: Command) -> Transition {
            self.send(UpdateKind::Command(cmd)).await
        }

        async fn text(&self, text: &str) -> Transition {
            self.send(UpdateKind::Text(text.to_string())).await
        }

        async fn location(&self, lat: f64, lon: f64) -> Transition {
            self.send(UpdateKind::Location(GeoPoint::new(lat, lon))).await
        }

        async fn action(&self, action: Action) -> Transition {
            self.send(UpdateKind::Action(action.label().to_string()))
                .await
        }

        async fn state(&self) -> SessionState {
            SessionStore::new(self.store.clone())
                .state(USER)
                .await
                .unwrap()
        }

        async fn places(&self) -> Vec<Place> {
            PlaceRepository::new(self.store.clone())
                .all(USER)
                .await
                .unwrap()
        }
    }

    #[test]
    fn idle_only_reacts_to_commands() {
        let idle = SessionState::Idle;
        assert_eq!(
            transition(idle, &UpdateKind::Command(Command::Add)),
            Transition::StartAdding
        );
        assert_eq!(
            transition(idle, &UpdateKind::Command(Command::Nearby)),
            Transition::StartSearch
        );
        assert_eq!(
            transition(idle, &UpdateKind::Command(Command::List)),
            Transition::List
        );
        for input in [
            UpdateKind::Text("Park".to_string()),
            UpdateKind::Location(GeoPoint::new(1.0, 2.0)),
            UpdateKind::Photo("f".to_string()),
            UpdateKind::Action(Action::CommitPlace.label().to_string()),
            UpdateKind::Action(Action::CancelSearch.label().to_string()),
        ] {
            assert_eq!(transition(idle, &input), Transition::Ignore, "{input:?}");
        }
    }

    #[test]
    fn global_commands_in_every_state() {
        for state in [
            SessionState::Idle,
            SessionState::Adding,
            SessionState::SearchingNearby,
        ] {
            assert_eq!(
                transition(state, &UpdateKind::Command(Command::Reset)),
                Transition::Reset
            );
            assert_eq!(
                transition(state, &UpdateKind::Command(Command::Help)),
                Transition::Help
            );
            assert_eq!(
                transition(state, &UpdateKind::Command(Command::Start)),
                Transition::Help
            );
            assert_eq!(
                transition(state, &UpdateKind::Command(Command::Unknown("x".into()))),
                Transition::UnknownCommand("x".to_string())
            );
        }
    }

    #[test]
    fn adding_routes_fragments() {
        let s = SessionState::Adding;
        assert_eq!(
            transition(s, &UpdateKind::Text("Park".into())),
            Transition::SetDraftName("Park".to_string())
        );
        assert_eq!(
            transition(s, &UpdateKind::Text("/list".into())),
            Transition::FinishAddingFirst
        );
        assert_eq!(
            transition(s, &UpdateKind::Command(Command::Nearby)),
            Transition::FinishAddingFirst
        );
        assert_eq!(
            transition(s, &UpdateKind::Text("a;b".into())),
            Transition::RejectName
        );
        assert_eq!(
            transition(s, &UpdateKind::Action("something else".into())),
            Transition::Ignore
        );
        assert_eq!(
            transition(s, &UpdateKind::Action(Action::CancelSearch.label().into())),
            Transition::Ignore
        );
    }

    #[test]
    fn searching_routes_fragments() {
        let s = SessionState::SearchingNearby;
        assert_eq!(
            transition(s, &UpdateKind::Text(" 500 ".into())),
            Transition::SetRadius(500)
        );
        for bad in ["abc", "-5", "1.5", "", "99999999999999999999999"] {
            assert_eq!(
                transition(s, &UpdateKind::Text(bad.into())),
                Transition::RejectRadius,
                "{bad:?}"
            );
        }
        assert_eq!(
            transition(s, &UpdateKind::Photo("f".into())),
            Transition::Ignore
        );
        assert_eq!(
            transition(s, &UpdateKind::Action(Action::CommitPlace.label().into())),
            Transition::Ignore
        );
        assert_eq!(
            transition(s, &UpdateKind::Command(Command::Add)),
            Transition::FinishSearchFirst
        );
    }

    #[tokio::test]
    async fn scenario_add_location_name_commit() {
        let h = Harness::new();
        assert_eq!(h.command(Command::Add).await, Transition::StartAdding);
        assert_eq!(h.state().await, SessionState::Adding);
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text(
                "Send a photo, the location and the name of the place, in any order.".to_string(),
                Some(vec!["Cancel adding"])
            )]
        );

        h.location(55.75, 37.61).await;
        h.text("Park").await;
        let menu = Some(vec!["Save place", "Preview", "Cancel adding"]);
        assert_eq!(
            h.notifier.take(),
            vec![
                Sent::Text("Location updated.".to_string(), menu.clone()),
                Sent::Text("Name updated.".to_string(), menu),
            ]
        );

        assert_eq!(h.action(Action::CommitPlace).await, Transition::CommitDraft);
        assert_eq!(h.state().await, SessionState::Idle);
        assert_eq!(
            h.places().await,
            vec![Place {
                photo: String::new(),
                name: "Park".to_string(),
                location: Some(GeoPoint::new(55.75, 37.61)),
            }]
        );
        assert_eq!(
            h.store.range_from_head(USER, 0, -1).await.unwrap(),
            vec![";Park;55.75, 37.61".to_string()]
        );

        // Only the state key is left behind.
        let keys = h.store.keys().await;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys.get("100_state").map(String::as_str), Some("idle"));
    }

    #[tokio::test]
    async fn fields_are_overwritten_and_photo_kept() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.send(UpdateKind::Photo("small".to_string())).await;
        h.text("Cafe").await;
        h.text("Better cafe").await;
        h.location(1.0, 1.0).await;
        h.location(2.0, 3.0).await;
        h.action(Action::CommitPlace).await;

        assert_eq!(
            h.places().await,
            vec![Place {
                photo: "small".to_string(),
                name: "Better cafe".to_string(),
                location: Some(GeoPoint::new(2.0, 3.0)),
            }]
        );
    }

    #[tokio::test]
    async fn empty_commit_keeps_existing_places() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.text("First").await;
        h.action(Action::CommitPlace).await;

        h.command(Command::Add).await;
        h.action(Action::CommitPlace).await;

        let places = h.places().await;
        assert_eq!(places.len(), 2);
        assert_eq!(
            places[0],
            Place {
                photo: String::new(),
                name: String::new(),
                location: None,
            }
        );
        assert_eq!(places[1].name, "First");
    }

    #[tokio::test]
    async fn reserved_name_warns_without_storing() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.notifier.take();

        assert_eq!(h.text("/add").await, Transition::FinishAddingFirst);
        assert_eq!(h.state().await, SessionState::Adding);
        assert!(h.store.keys().await.get("100_name").is_none());
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text(
                "Finish adding the current place first, or cancel it.".to_string(),
                Some(vec!["Save place", "Preview", "Cancel adding"])
            )]
        );
    }

    #[tokio::test]
    async fn cancel_adding_clears_draft() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.text("Park").await;
        h.location(1.0, 1.0).await;
        h.notifier.take();

        assert_eq!(h.action(Action::CancelAdding).await, Transition::CancelAdding);
        assert_eq!(h.state().await, SessionState::Idle);
        assert!(h.places().await.is_empty());
        assert_eq!(h.store.keys().await.len(), 1);
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text("Adding cancelled.".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn preview_shows_draft_without_committing() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.action(Action::PreviewDraft).await;
        h.send(UpdateKind::Photo("ph".to_string())).await;
        h.text("Pier").await;
        h.location(1.5, 2.5).await;
        h.notifier.take();

        h.action(Action::PreviewDraft).await;
        assert_eq!(
            h.notifier.take(),
            vec![
                Sent::Photo("ph".to_string(), "Place: Pier".to_string()),
                Sent::Location(GeoPoint::new(1.5, 2.5)),
            ]
        );
        assert_eq!(h.state().await, SessionState::Adding);
        assert!(h.places().await.is_empty());
    }

    #[tokio::test]
    async fn scenario_nearby_filters_by_radius() {
        let h = Harness::new();
        let repo = PlaceRepository::new(h.store.clone());
        for (name, lon) in [("near", 0.004), ("far", 0.01)] {
            repo.commit(
                USER,
                &Place {
                    photo: String::new(),
                    name: name.to_string(),
                    location: Some(GeoPoint::new(0.0, lon)),
                },
            )
            .await
            .unwrap();
        }

        h.command(Command::Nearby).await;
        assert_eq!(h.state().await, SessionState::SearchingNearby);
        assert_eq!(h.text("500").await, Transition::SetRadius(500));
        h.notifier.take();

        assert_eq!(
            h.location(0.0, 0.0).await,
            Transition::Search(GeoPoint::new(0.0, 0.0))
        );
        assert_eq!(
            h.notifier.take(),
            vec![
                Sent::Text("near".to_string(), None),
                Sent::Location(GeoPoint::new(0.0, 0.004)),
            ]
        );
        assert_eq!(h.state().await, SessionState::Idle);
        assert!(h.store.get("100_dis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nearby_with_no_hits_says_so() {
        let h = Harness::new();
        h.command(Command::Nearby).await;
        h.text("10").await;
        h.notifier.take();

        h.location(10.0, 10.0).await;
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text("No saved places within 10 m.".to_string(), None)]
        );
        assert_eq!(h.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn scenario_non_numeric_radius_is_rejected() {
        let h = Harness::new();
        h.command(Command::Nearby).await;
        h.notifier.take();

        assert_eq!(h.text("abc").await, Transition::RejectRadius);
        assert_eq!(h.state().await, SessionState::SearchingNearby);
        assert!(h.store.keys().await.get("100_dis").is_none());
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text(
                "Send the radius as a whole number of meters.".to_string(),
                None
            )]
        );
    }

    #[tokio::test]
    async fn location_before_radius_is_rejected() {
        let h = Harness::new();
        h.command(Command::Nearby).await;
        h.notifier.take();

        h.location(0.0, 0.0).await;
        assert_eq!(h.state().await, SessionState::SearchingNearby);
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text(
                "Send the search radius in meters first.".to_string(),
                Some(vec!["Cancel search"])
            )]
        );
    }

    #[tokio::test]
    async fn cancel_search_returns_to_idle() {
        let h = Harness::new();
        h.command(Command::Nearby).await;
        h.text("300").await;
        assert_eq!(h.action(Action::CancelSearch).await, Transition::CancelSearch);
        assert_eq!(h.state().await, SessionState::Idle);
        assert!(h.store.get("100_dis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scenario_reset_then_list_is_empty() {
        let h = Harness::new();
        h.command(Command::Add).await;
        h.text("Park").await;
        h.action(Action::CommitPlace).await;

        // Reset works mid-flow and leaves the state alone.
        h.command(Command::Nearby).await;
        assert_eq!(h.command(Command::Reset).await, Transition::Reset);
        assert_eq!(h.state().await, SessionState::SearchingNearby);
        assert!(h.places().await.is_empty());

        h.action(Action::CancelSearch).await;
        h.notifier.take();
        assert_eq!(h.command(Command::List).await, Transition::List);
        assert_eq!(
            h.notifier.take(),
            vec![Sent::Text("No places saved yet.".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn list_renders_recent_places_and_skips_corrupt() {
        let h = Harness::new();
        h.store.prepend(USER, ";Old;1, 1").await.unwrap();
        h.store.prepend(USER, "broken record").await.unwrap();
        h.store.prepend(USER, "ph;Photo spot;").await.unwrap();
        h.store.prepend(USER, ";;2, 2").await.unwrap();

        h.command(Command::List).await;
        assert_eq!(
            h.notifier.take(),
            vec![
                Sent::Location(GeoPoint::new(2.0, 2.0)),
                Sent::Photo("ph".to_string(), "Place: Photo spot".to_string()),
                Sent::Text("Place: Old".to_string(), None),
                Sent::Location(GeoPoint::new(1.0, 1.0)),
            ]
        );
    }

    #[tokio::test]
    async fn list_is_bounded() {
        let h = Harness::new();
        for i in 0..13 {
            h.store
                .prepend(USER, &format!(";p{i};"))
                .await
                .unwrap();
        }
        h.command(Command::List).await;
        let sent = h.notifier.take();
        assert_eq!(sent.len(), 11);
        assert_eq!(sent[0], Sent::Text("Place: p12".to_string(), None));
        assert_eq!(sent[10], Sent::Text("Place: p2".to_string(), None));
    }

    #[tokio::test]
    async fn updates_irrelevant_to_state_are_silent() {
        let h = Harness::new();
        assert_eq!(h.location(1.0, 1.0).await, Transition::Ignore);
        assert_eq!(h.text("hello").await, Transition::Ignore);
        assert!(h.notifier.take().is_empty());
        assert!(h.store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn users_do_not_share_sessions() {
        let h = Harness::new();
        h.command(Command::Add).await;

        let other = UserId(200);
        let t = h
            .bot
            .handle(&IncomingUpdate::new(other, UpdateKind::Text("Park".into())))
            .await
            .unwrap();
        assert_eq!(t, Transition::Ignore);
        assert_eq!(h.state().await, SessionState::Adding);
    }
}
