use viz_presets::analysis::{AnalyserSettings, AnalysisBuffer};
use viz_presets::lifecycle::{FrameGate, LoopState, Session, StartAction, StopToken};
use viz_presets::{PresetKind, VisualizerVariables};

/// Stand-in for the media element's play state.
struct Media {
    paused: bool,
}

/// A preset start as the browser runtime performs it, minus the GPU.
fn start_preset(session: &mut Session<StopToken>, media: &mut Media) -> Option<FrameGate> {
    let ticket = session.begin();
    match StartAction::from_paused(media.paused) {
        StartAction::Pause => {
            media.paused = true;
            None
        }
        StartAction::Play => {
            media.paused = false;
            let token = StopToken::new();
            let mut gate = FrameGate::new(token.clone());
            gate.arm();
            session.commit(ticket, token).then_some(gate)
        }
    }
}

#[test]
fn unmanaged_loops_both_keep_running() {
    // Two loops armed against the same surface with nothing tying them
    // together: the hazard a session exists to prevent.
    let mut first = FrameGate::new(StopToken::new());
    let mut second = FrameGate::new(StopToken::new());
    first.arm();
    second.arm();
    for _ in 0..3 {
        assert!(first.begin_frame());
        assert!(second.begin_frame());
    }
}

#[test]
fn restarting_in_a_session_leaves_one_loop() {
    let mut session = Session::new();
    let mut media = Media { paused: true };

    let mut first = start_preset(&mut session, &mut media).expect("first start arms");
    assert!(first.begin_frame());

    // Paused again before the second start, as after a user pause.
    media.paused = true;
    let mut second = start_preset(&mut session, &mut media).expect("second start arms");

    assert!(!first.begin_frame());
    assert_eq!(first.state(), LoopState::Stopped);
    assert!(second.begin_frame());
    assert!(session.is_running());
    assert!(session.current().is_some_and(|h| !h.is_stopped()));
}

#[test]
fn already_playing_media_is_paused_and_not_armed() {
    let mut session = Session::new();
    let mut media = Media { paused: false };

    assert!(start_preset(&mut session, &mut media).is_none());
    assert!(media.paused);
    assert!(!session.is_running());
}

#[test]
fn playing_media_start_also_stops_previous_loop() {
    let mut session = Session::new();
    let mut media = Media { paused: true };
    let mut running = start_preset(&mut session, &mut media).unwrap();
    assert!(running.begin_frame());

    // media is now playing; starting again toggles it off
    assert!(start_preset(&mut session, &mut media).is_none());
    assert!(media.paused);
    assert!(!running.begin_frame());
    assert!(!session.is_running());
}

#[test]
fn analyser_and_buffer_follow_bar_count() {
    let mut vars = VisualizerVariables {
        bar_count: Some(64),
        base_color_low: Some("#000000".into()),
        base_color_high: Some("#ffffff".into()),
        ..Default::default()
    };
    for n in [64u32, 128, 1024] {
        vars.bar_count = Some(n);
        let params = vars.resolve().unwrap();
        let settings = AnalyserSettings::for_bar_count(params.bar_count).unwrap();
        assert_eq!(settings.fft_size(), 2 * n);
        for kind in PresetKind::ALL {
            let buffer = AnalysisBuffer::new(kind.analysis(), params.bar_count);
            assert_eq!(buffer.len() as u32, settings.frequency_bin_count());
        }
    }
}
