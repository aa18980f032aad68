//! Contract tests for the display layer
//!
//! Drive the headless backend through the same calls an editor makes and
//! check what a real display would have presented.

use std::thread;
use std::time::{Duration, Instant};

use grinder_display::app::Config;
use grinder_display::backend::{Backend, HeadlessBackend};
use grinder_display::core::{attr, Snapshot};
use grinder_display::input::{timeout_from_secs, NativeEvent, NativeKey};
use grinder_display::keys::{self, Key, Modifiers, VirtualKey};

fn started() -> HeadlessBackend {
    let mut display = HeadlessBackend::new();
    display.init(&["editor".to_string()]);
    display.start(&Config::default()).unwrap();
    display
}

fn frame(display: &HeadlessBackend) -> &Snapshot {
    display.last_frame().expect("no frame presented")
}

#[test]
fn write_then_sync_changes_one_cell() {
    let mut display = started();
    assert_eq!(display.screen_size(), (80, 25));

    display.sync();
    let before = frame(&display).clone();

    display.write_char(5, 5, 'X');
    display.sync();
    let after = frame(&display);

    for y in 0..25 {
        for x in 0..80 {
            let cell = after.cell(x, y).unwrap();
            if (x, y) == (5, 5) {
                assert_eq!(cell.c, 'X');
                assert_eq!(cell.attr.bits(), 0);
            } else {
                assert_eq!(cell, before.cell(x, y).unwrap(), "({}, {})", x, y);
            }
        }
    }
}

#[test]
fn out_of_range_calls_are_ignored() {
    let mut display = started();
    display.sync();
    let before = frame(&display).clone();

    display.write_char(-1, 0, 'a');
    display.write_char(80, 0, 'a');
    display.write_char(0, 25, 'a');
    display.write_char(i32::MAX, i32::MIN, 'a');
    display.clear_area(100, 100, 200, 200);
    display.clear_area(10, 10, 5, 5);
    display.sync();

    assert!(frame(&display).content_equals(&before));
}

#[test]
fn poll_with_nothing_pending_times_out() {
    let mut display = started();
    let start = Instant::now();
    assert_eq!(display.read_key(Some(Duration::ZERO)), VirtualKey::TIMEOUT);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn short_timeout_elapses() {
    let mut display = started();
    let start = Instant::now();
    let key = display.read_key(Some(Duration::from_millis(30)));
    assert_eq!(key, VirtualKey::TIMEOUT);
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn blocking_read_wakes_on_injected_key() {
    let mut display = started();
    let injector = display.injector();

    let typist = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        injector.key(NativeKey::Named(Key::Left), Modifiers::SHIFT);
    });

    let key = display.read_key(timeout_from_secs(-1.0));
    typist.join().unwrap();

    assert_eq!(key.raw(), -(0xF702 | keys::SHIFT));
    assert_eq!(display.key_name(key.raw()), "KEY_SLEFT");
}

#[test]
fn irrelevant_events_do_not_end_the_wait() {
    let mut display = started();
    let injector = display.injector();
    injector.send(NativeEvent::Other);
    injector.key(NativeKey::Char('a'), Modifiers::NONE);
    injector.text("a");

    assert_eq!(display.read_key(None), VirtualKey::text('a'));
}

#[test]
fn ctrl_letters_and_sentinels() {
    let mut display = started();
    let injector = display.injector();
    injector.key(NativeKey::Char('a'), Modifiers::CTRL);
    injector.key(NativeKey::Char('z'), Modifiers::CTRL_SHIFT);
    injector.resize();
    injector.close();

    let names: Vec<String> = (0..4).map(|_| display.read_key(None).name()).collect();
    assert_eq!(names, ["KEY_^A", "KEY_S^Z", "KEY_RESIZE", "KEY_QUIT"]);

    // A resize never reshapes the buffer.
    assert_eq!(display.screen_size(), (80, 25));
}

#[test]
fn attribute_register_order_matters() {
    let mut display = started();

    display.set_attr(0xff, attr::BOLD);
    display.set_attr(!attr::BOLD, 0);
    display.write_char(0, 0, 'a');

    display.set_attr(!attr::BOLD, 0);
    display.set_attr(0xff, attr::BOLD);
    display.write_char(1, 0, 'b');

    display.set_attr(0, attr::UNDERLINE);
    display.write_char(2, 0, 'c');
    display.sync();

    let frame = frame(&display);
    assert_eq!(frame.cell(0, 0).unwrap().attr.bits(), 0);
    assert_eq!(frame.cell(1, 0).unwrap().attr.bits(), attr::BOLD);
    assert_eq!(frame.cell(2, 0).unwrap().attr.bits(), attr::UNDERLINE);
    assert_eq!(frame.attr, attr::UNDERLINE);
}

#[test]
fn clear_area_uses_current_attribute() {
    let mut display = started();
    for x in 0..10 {
        display.write_char(x, 1, '#');
    }
    display.set_attr(0xff, attr::REVERSE);
    display.clear_area(2, 0, 4, 3);
    display.sync();

    let frame = frame(&display);
    assert_eq!(frame.row_text(1), "##   #####");
    assert!(frame.cell(3, 0).unwrap().attr.reverse);
    assert!(!frame.cell(5, 1).unwrap().attr.reverse);
}

#[test]
fn clear_screen_blanks_everything() {
    let mut display = started();
    display.write_char(79, 24, 'z');
    display.clear_screen();
    display.sync();
    assert_eq!(frame(&display).to_text(), "\n");
}

#[test]
fn cursor_is_advisory() {
    let mut display = started();
    display.write_char(3, 3, 'k');
    display.set_cursor(3, 3, true);
    display.set_cursor(500, -2, true);
    display.sync();

    let frame = frame(&display);
    assert_eq!(frame.cell(3, 3).unwrap().c, 'k');
    assert_eq!((frame.cursor.x, frame.cursor.y), (500, -2));
}

#[test]
fn replay_is_deterministic() {
    fn script(display: &mut HeadlessBackend) -> String {
        display.set_attr(0xff, attr::DIM);
        for (i, c) in "deterministic".chars().enumerate() {
            display.write_char(i as i32, 2, c);
        }
        display.set_cursor(4, 2, true);
        display.sync();
        display.last_frame().unwrap().to_json().unwrap()
    }

    let a = script(&mut started());
    let b = script(&mut started());
    assert_eq!(a, b);

    let restored = Snapshot::from_json(&a).unwrap();
    assert_eq!(restored.row_text(2), "deterministic");
}

#[test]
fn names_round_trip_through_key_codes() {
    for key in Key::named().chain(Key::function_keys()) {
        for mods in [
            Modifiers::NONE,
            Modifiers::SHIFT,
            Modifiers::CTRL,
            Modifiers::CTRL_SHIFT,
        ] {
            let code = VirtualKey::key(key, mods).unwrap();
            let name = code.name();
            assert!(!name.starts_with("KEY_UNKNOWN"), "{:?} {:?}", key, mods);
            assert_eq!(VirtualKey::from_name(&name), Some(code), "{}", name);
        }
    }
}

#[test]
fn shutdown_and_restart() {
    let mut display = started();
    display.write_char(0, 0, 'a');
    display.shutdown();

    assert_eq!(display.screen_size(), (0, 0));
    display.write_char(0, 0, 'b');

    display.start(&Config::default()).unwrap();
    display.sync();
    assert_eq!(frame(&display).row_text(0), "");
}
