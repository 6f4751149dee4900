use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use unitedpackers_api::dashboard::{
    CountSnapshot, CountSource, DashboardPoller, Notification, Tab, diff,
};

/// Replays scripted results; repeats the last snapshot once the script runs out.
struct ScriptedSource {
    script: VecDeque<Result<CountSnapshot, String>>,
    last: CountSnapshot,
    calls: usize,
}

impl ScriptedSource {
    fn new(script: Vec<Result<CountSnapshot, String>>) -> Self {
        Self {
            script: script.into(),
            last: CountSnapshot::default(),
            calls: 0,
        }
    }
}

#[async_trait]
impl CountSource for ScriptedSource {
    async fn fetch_counts(&mut self) -> anyhow::Result<CountSnapshot> {
        self.calls += 1;
        match self.script.pop_front() {
            Some(Ok(snapshot)) => {
                self.last = snapshot;
                Ok(snapshot)
            }
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => Ok(self.last),
        }
    }
}

fn counts(quotes: i64, users: i64, enquiries: i64, contacts: i64) -> CountSnapshot {
    CountSnapshot {
        quotes,
        users,
        enquiries,
        contacts,
    }
}

#[tokio::test]
async fn first_poll_only_sets_baseline() {
    let mut poller = DashboardPoller::new(ScriptedSource::new(vec![Ok(counts(10, 5, 3, 2))]));

    let notifications = poller.poll().await.unwrap();
    assert!(notifications.is_empty());
    assert_eq!(poller.snapshot(), Some(counts(10, 5, 3, 2)));
    assert_eq!(poller.badges().total(), 0);
}

#[tokio::test]
async fn positive_deltas_notify_and_bump_badges() {
    let mut poller = DashboardPoller::new(ScriptedSource::new(vec![
        Ok(counts(10, 5, 3, 2)),
        Ok(counts(12, 5, 4, 1)),
        Ok(counts(13, 5, 4, 1)),
    ]));

    poller.poll().await.unwrap();
    let notifications = poller.poll().await.unwrap();
    assert_eq!(
        notifications,
        vec![Notification::new(Tab::Quotes, 2), Notification::new(Tab::Enquiries, 1)]
    );
    assert_eq!(notifications[0].message, "2 new quote requests");
    assert_eq!(notifications[1].message, "1 new enquiry");

    poller.poll().await.unwrap();
    let badges = poller.badges();
    assert_eq!(badges.get(Tab::Quotes), 3);
    assert_eq!(badges.get(Tab::Enquiries), 1);
    assert_eq!(badges.get(Tab::Contacts), 0);
    assert_eq!(poller.snapshot(), Some(counts(13, 5, 4, 1)));
}

#[tokio::test]
async fn unchanged_counts_are_quiet() {
    let mut poller = DashboardPoller::new(ScriptedSource::new(vec![Ok(counts(1, 1, 1, 1))]));
    poller.poll().await.unwrap();
    assert!(poller.poll().await.unwrap().is_empty());
    assert!(poller.poll().await.unwrap().is_empty());
    assert_eq!(poller.badges().total(), 0);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_state() {
    let mut poller = DashboardPoller::new(ScriptedSource::new(vec![
        Ok(counts(10, 5, 3, 2)),
        Ok(counts(11, 5, 3, 2)),
        Err("connection refused".into()),
        Ok(counts(11, 6, 3, 2)),
    ]));

    poller.poll().await.unwrap();
    poller.poll().await.unwrap();
    let before = (poller.snapshot(), poller.badges());

    let err = poller.poll().await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
    assert_eq!((poller.snapshot(), poller.badges()), before);

    let notifications = poller.poll().await.unwrap();
    assert_eq!(notifications, vec![Notification::new(Tab::Users, 1)]);
}

#[tokio::test]
async fn viewing_a_tab_clears_its_badge() {
    let mut poller = DashboardPoller::new(ScriptedSource::new(vec![
        Ok(counts(0, 0, 0, 0)),
        Ok(counts(2, 1, 0, 3)),
    ]));
    poller.poll().await.unwrap();
    poller.poll().await.unwrap();

    poller.mark_viewed(Tab::Contacts);
    let badges = poller.badges();
    assert_eq!(badges.get(Tab::Contacts), 0);
    assert_eq!(badges.get(Tab::Quotes), 2);
    assert_eq!(badges.get(Tab::Users), 1);
}

#[test]
fn deletions_do_not_notify() {
    assert!(diff(&counts(5, 5, 5, 5), &counts(4, 5, 2, 0)).is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_forwards_notifications_until_cancelled() {
    let source = ScriptedSource::new(vec![
        Ok(counts(1, 1, 1, 1)),
        Err("timeout".into()),
        Ok(counts(2, 1, 1, 1)),
    ]);
    let poller = DashboardPoller::new(source);
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(8);

    let handle = tokio::spawn(poller.run(Duration::from_secs(15), cancel.clone(), tx));

    let notification = rx.recv().await.expect("notification");
    assert_eq!(notification, Notification::new(Tab::Quotes, 1));

    cancel.cancel();
    let poller = handle.await.unwrap();
    assert_eq!(poller.snapshot(), Some(counts(2, 1, 1, 1)));
    assert_eq!(poller.badges().get(Tab::Quotes), 1);
    assert!(poller.source().calls >= 3);
}

#[tokio::test(start_paused = true)]
async fn run_stops_when_sink_closes() {
    let source = ScriptedSource::new(vec![Ok(counts(0, 0, 0, 0)), Ok(counts(1, 0, 0, 0))]);
    let poller = DashboardPoller::new(source);
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let poller = poller
        .run(Duration::from_secs(15), CancellationToken::new(), tx)
        .await;
    assert_eq!(poller.snapshot(), Some(counts(1, 0, 0, 0)));
}
