//! Registry consistency under concurrent subscribe, unsubscribe, and publish.

use std::sync::Arc;

use chatline_core::types::{RoomId, UserId, UserIdentity};
use chatline_realtime::{ConnectionHandle, MembershipRegistry, NotificationEvent, ServerEvent};

const USERS: i64 = 10;
const CONNECTIONS: usize = 100;
const PUBLISHES: usize = 1000;

fn event(n: usize) -> Arc<ServerEvent> {
    Arc::new(ServerEvent::Notification(NotificationEvent {
        room_id: RoomId(1),
        room_name: "load".to_string(),
        sender_username: "load".to_string(),
        message: n.to_string(),
    }))
}

fn leaves(n: usize) -> bool {
    n / USERS as usize >= 5
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_membership_changes_stay_consistent() {
    let registry = Arc::new(MembershipRegistry::new());
    let mut tasks = Vec::new();

    // Each user opens ten connections; the second five leave again.
    for n in 0..CONNECTIONS {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let user = UserIdentity::new(UserId(n as i64 % USERS), format!("u{n}"));
            let (handle, rx) = ConnectionHandle::new(&user, PUBLISHES);
            let handle = Arc::new(handle);
            assert!(registry.subscribe(handle.clone()));
            tokio::task::yield_now().await;
            if leaves(n) {
                assert!(registry.unsubscribe(handle.user_id, handle.id));
            }
            (n, handle, rx)
        }));
    }

    let mut publishers = Vec::new();
    for n in 0..PUBLISHES {
        let registry = registry.clone();
        publishers.push(tokio::spawn(async move {
            registry.publish(UserId(n as i64 % USERS), &event(n));
        }));
    }

    let mut connections = Vec::new();
    for task in tasks {
        connections.push(task.await.unwrap());
    }
    for publisher in publishers {
        publisher.await.unwrap();
    }

    assert_eq!(registry.connection_count(), CONNECTIONS / 2);
    assert_eq!(registry.group_count(), USERS as usize);
    for user in 0..USERS {
        assert_eq!(registry.group_size(UserId(user)), CONNECTIONS / USERS as usize / 2);
    }

    // Every remaining connection gets exactly one copy of a fresh event;
    // departed connections get none.
    let marker = event(usize::MAX);
    for user in 0..USERS {
        assert_eq!(registry.publish(UserId(user), &marker), 5);
    }
    for (n, handle, mut rx) in connections {
        let mut markers = 0;
        while let Ok(received) = rx.try_recv() {
            if received == marker {
                markers += 1;
            }
        }
        let expected = if leaves(n) { 0 } else { 1 };
        assert_eq!(markers, expected, "connection {} of user {}", n, handle.user_id);
    }
}
