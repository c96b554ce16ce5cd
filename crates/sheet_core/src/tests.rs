//! Scenario tests for the sheet controller
//!
//! Container is 390x800 and automatic content measures 200, so the heights
//! `[Fixed(700), Fixed(400), Automatic]` resolve to offsets `[100, 400, 580]`.

use crate::prelude::*;
use crate::{SheetError, TranslationTarget};

const FRAME: f32 = 1.0 / 60.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn container() -> ContainerSize {
    ContainerSize::new(390.0, 800.0)
}

fn heights() -> Vec<SheetHeight> {
    vec![
        SheetHeight::Fixed(700.0),
        SheetHeight::Fixed(400.0),
        SheetHeight::Automatic,
    ]
}

fn create_sheet(config: SheetConfig) -> SheetController {
    init_tracing();
    SheetController::new(heights(), |_width: f32| 200.0, config)
}

/// Step frames until the sheet stops moving, collecting every effect
fn run_frames(sheet: &mut SheetController) -> Vec<SheetEffect> {
    let mut effects = Vec::new();
    for _ in 0..1200 {
        effects.extend(sheet.handle(SheetEvent::Frame { dt: FRAME }).unwrap());
        if !matches!(
            sheet.state(),
            SheetState::Animating | SheetState::Dismissing
        ) {
            break;
        }
    }
    effects
}

fn presented(config: SheetConfig) -> SheetController {
    let mut sheet = create_sheet(config);
    sheet
        .handle(SheetEvent::Present {
            container: container(),
        })
        .unwrap();
    run_frames(&mut sheet);
    sheet
}

fn drag(sheet: &mut SheetController, translation: f32, velocity: f32) -> Vec<SheetEffect> {
    sheet.handle(SheetEvent::DragBegan).unwrap();
    sheet
        .handle(SheetEvent::DragChanged {
            translation,
            velocity,
        })
        .unwrap();
    sheet
        .handle(SheetEvent::DragEnded {
            translation,
            velocity,
        })
        .unwrap()
        .into_vec()
}

fn settled_index(effects: &[SheetEffect]) -> Option<usize> {
    effects.iter().find_map(|effect| match effect {
        SheetEffect::Settled { index } => Some(*index),
        _ => None,
    })
}

#[derive(Default)]
struct RecordingHost {
    allow_dismiss: bool,
    positions: Vec<f32>,
    alphas: Vec<f32>,
    calls: Vec<String>,
}

impl SheetHost for RecordingHost {
    fn set_live_position(&mut self, y: f32) {
        self.positions.push(y);
    }

    fn set_overlay_alpha(&mut self, alpha: f32) {
        self.alphas.push(alpha);
    }

    fn propose_dismiss(&mut self, _action: DismissAction) -> bool {
        self.calls.push("propose".to_string());
        self.allow_dismiss
    }

    fn notify_dismiss_cancelled(&mut self, _action: DismissAction) {
        self.calls.push("dismiss_cancelled".to_string());
    }

    fn notify_will_dismiss(&mut self, _action: DismissAction) {
        self.calls.push("will_dismiss".to_string());
    }

    fn notify_did_dismiss(&mut self, _action: DismissAction) {
        self.calls.push("did_dismiss".to_string());
    }

    fn notify_settled(&mut self, index: usize) {
        self.calls.push(format!("settled {}", index));
    }
}

fn pump_frames<H: SheetHost>(sheet: &mut SheetController, host: &mut H) {
    for _ in 0..1200 {
        sheet
            .dispatch(SheetEvent::Frame { dt: FRAME }, host)
            .unwrap();
        if !matches!(
            sheet.state(),
            SheetState::Animating | SheetState::Dismissing
        ) {
            break;
        }
    }
}

// ============================================================================
// Presentation
// ============================================================================

#[test]
fn test_present_animates_in_from_container_bottom() {
    let mut sheet = create_sheet(SheetConfig::default());
    assert_eq!(sheet.state(), SheetState::Detached);

    let effects = sheet
        .handle(SheetEvent::Present {
            container: container(),
        })
        .unwrap();

    assert_eq!(effects[0], SheetEffect::SetPosition(800.0));
    assert_eq!(sheet.state(), SheetState::Animating);
    assert_eq!(sheet.offsets(), &[100.0, 400.0, 580.0]);
    assert_eq!(sheet.targets().len(), 5);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.state(), SheetState::Idle);
    assert_eq!(sheet.current_index(), 2);
    assert_eq!(sheet.position(), 580.0);
}

#[test]
fn test_present_uses_configured_start_index() {
    let sheet = presented(SheetConfig::default().with_start_index(0));
    assert_eq!(sheet.current_index(), 0);
    assert_eq!(sheet.position(), 100.0);
}

#[test]
fn test_present_clamps_start_index() {
    let sheet = presented(SheetConfig::default().with_start_index(9));
    assert_eq!(sheet.current_index(), 2);
    assert_eq!(sheet.position(), 580.0);
}

#[test]
fn test_present_again_after_dismissal() {
    let mut sheet = presented(SheetConfig::default());
    sheet
        .handle(SheetEvent::Dismiss {
            action: DismissAction::Programmatic,
        })
        .unwrap();
    sheet
        .handle(SheetEvent::DismissDecision { allowed: true })
        .unwrap();
    run_frames(&mut sheet);
    assert_eq!(sheet.state(), SheetState::Dismissed);

    sheet
        .handle(SheetEvent::Present {
            container: container(),
        })
        .unwrap();
    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.position(), 580.0);
}

#[test]
fn test_events_before_present_are_noops() {
    let mut sheet = create_sheet(SheetConfig::default());

    for event in [
        SheetEvent::DragBegan,
        SheetEvent::DragChanged {
            translation: 40.0,
            velocity: 0.0,
        },
        SheetEvent::DragEnded {
            translation: 40.0,
            velocity: 0.0,
        },
        SheetEvent::Frame { dt: FRAME },
        SheetEvent::Reset,
        SheetEvent::TransitionTo { index: 7 },
        SheetEvent::Dismiss {
            action: DismissAction::BackdropTap,
        },
    ] {
        let effects = sheet.handle(event).unwrap();
        assert!(effects.is_empty());
    }

    assert_eq!(sheet.state(), SheetState::Detached);
}

// ============================================================================
// Dragging
// ============================================================================

#[test]
fn test_small_drag_snaps_back() {
    let mut sheet = presented(SheetConfig::default());

    sheet.handle(SheetEvent::DragBegan).unwrap();
    assert_eq!(sheet.state(), SheetState::Dragging);

    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: -30.0,
            velocity: -100.0,
        })
        .unwrap();
    assert_eq!(effects[0], SheetEffect::SetPosition(550.0));

    sheet
        .handle(SheetEvent::DragEnded {
            translation: -30.0,
            velocity: 0.0,
        })
        .unwrap();
    assert_eq!(sheet.state(), SheetState::Animating);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.position(), 580.0);
}

#[test]
fn test_drag_past_threshold_moves_to_neighbour() {
    let mut sheet = presented(SheetConfig::default());

    // Boundary between 400 and 580 sits at 580 - 45 while resting at 580
    drag(&mut sheet, -100.0, -300.0);
    let effects = run_frames(&mut sheet);

    assert_eq!(settled_index(&effects), Some(1));
    assert_eq!(sheet.current_index(), 1);
    assert_eq!(sheet.position(), 400.0);

    // Targets are rebuilt around the new index
    let range = sheet
        .targets()
        .iter()
        .find_map(|target| match target {
            TranslationTarget::Range(range) if range.index == 1 => Some(range.range.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(range, 325.0..445.0);
}

#[test]
fn test_drag_above_top_offset_rubber_bands() {
    let mut sheet = presented(SheetConfig::default().with_start_index(0));

    sheet.handle(SheetEvent::DragBegan).unwrap();
    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: -200.0,
            velocity: -800.0,
        })
        .unwrap();

    let SheetEffect::SetPosition(y) = effects[0] else {
        panic!("expected a position, got {:?}", effects[0]);
    };
    // Radius is threshold(0, 100) = 25
    assert!(y < 100.0 && y >= 75.0);

    sheet
        .handle(SheetEvent::DragEnded {
            translation: -200.0,
            velocity: -800.0,
        })
        .unwrap();
    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(0));
    assert_eq!(sheet.position(), 100.0);
}

#[test]
fn test_drag_emits_overlay_alpha() {
    let mut sheet = presented(SheetConfig::default());

    sheet.handle(SheetEvent::DragBegan).unwrap();
    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: 100.0,
            velocity: 0.0,
        })
        .unwrap();

    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], SheetEffect::SetPosition(680.0));
    let SheetEffect::SetOverlayAlpha(alpha) = effects[1] else {
        panic!("expected an alpha, got {:?}", effects[1]);
    };
    assert!((alpha - 580.0 / 680.0).abs() < 1e-6);
}

#[test]
fn test_overlay_alpha_disabled() {
    let mut sheet = presented(SheetConfig::default().with_dims_background(false));

    sheet.handle(SheetEvent::DragBegan).unwrap();
    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: 100.0,
            velocity: 0.0,
        })
        .unwrap();

    assert_eq!(effects.into_vec(), vec![SheetEffect::SetPosition(680.0)]);
    assert_eq!(sheet.overlay_alpha(), None);
}

#[test]
fn test_drag_cancel_resolves_at_last_location() {
    let mut sheet = presented(SheetConfig::default());

    sheet.handle(SheetEvent::DragBegan).unwrap();
    sheet
        .handle(SheetEvent::DragChanged {
            translation: -120.0,
            velocity: -2000.0,
        })
        .unwrap();
    // Cancel resolves at 460, inside the neighbour's region, with no velocity
    sheet.handle(SheetEvent::DragCancelled).unwrap();
    let effects = run_frames(&mut sheet);

    assert_eq!(settled_index(&effects), Some(1));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, SheetEffect::ProposeDismiss(_))));
}

#[test]
fn test_drag_interrupts_animation() {
    let mut sheet = create_sheet(SheetConfig::default());
    sheet
        .handle(SheetEvent::Present {
            container: container(),
        })
        .unwrap();
    for _ in 0..3 {
        sheet.handle(SheetEvent::Frame { dt: FRAME }).unwrap();
    }
    let frozen = sheet.position();
    assert!(frozen < 800.0 && frozen > 580.0);

    sheet.handle(SheetEvent::DragBegan).unwrap();
    assert_eq!(sheet.state(), SheetState::Dragging);
    assert!(!sheet.animator().is_running());

    let effects = sheet.handle(SheetEvent::Frame { dt: FRAME }).unwrap();
    assert!(effects.is_empty());
    assert_eq!(sheet.position(), frozen);
}

#[test]
fn test_bottom_stops_when_not_dismissible() {
    let mut sheet = presented(SheetConfig::default().with_dismiss(DismissEdges::none()));

    sheet.handle(SheetEvent::DragBegan).unwrap();
    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: 150.0,
            velocity: 900.0,
        })
        .unwrap();
    assert_eq!(effects[0], SheetEffect::SetPosition(580.0));

    let effects = sheet
        .handle(SheetEvent::DragEnded {
            translation: 150.0,
            velocity: 900.0,
        })
        .unwrap();
    assert!(effects.is_empty());

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.state(), SheetState::Idle);
}

// ============================================================================
// Dismissal
// ============================================================================

#[test]
fn test_drag_past_bottom_proposes_dismiss() {
    let mut sheet = presented(SheetConfig::default());

    let effects = drag(&mut sheet, 100.0, 500.0);
    assert_eq!(
        effects,
        vec![SheetEffect::ProposeDismiss(DismissAction::Drag {
            velocity: 500.0
        })]
    );
    assert_eq!(sheet.state(), SheetState::DismissProposed);

    let effects = sheet
        .handle(SheetEvent::DismissDecision { allowed: true })
        .unwrap();
    assert_eq!(
        effects.into_vec(),
        vec![SheetEffect::WillDismiss(DismissAction::Drag {
            velocity: 500.0
        })]
    );
    assert_eq!(sheet.state(), SheetState::Dismissing);

    let effects = run_frames(&mut sheet);
    assert_eq!(
        effects.last(),
        Some(&SheetEffect::DidDismiss(DismissAction::Drag {
            velocity: 500.0
        }))
    );
    assert_eq!(sheet.state(), SheetState::Dismissed);
    assert_eq!(sheet.position(), 800.0);
}

#[test]
fn test_dismiss_veto_returns_to_resting_offset() {
    let mut sheet = presented(SheetConfig::default());

    drag(&mut sheet, 100.0, 500.0);
    let effects = sheet
        .handle(SheetEvent::DismissDecision { allowed: false })
        .unwrap();
    assert_eq!(
        effects.into_vec(),
        vec![SheetEffect::DismissCancelled(DismissAction::Drag {
            velocity: 500.0
        })]
    );
    assert_eq!(sheet.state(), SheetState::Animating);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.position(), 580.0);
    assert_eq!(sheet.state(), SheetState::Idle);
}

#[test]
fn test_backdrop_tap_goes_through_proposal() {
    let mut sheet = presented(SheetConfig::default());

    let effects = sheet
        .handle(SheetEvent::Dismiss {
            action: DismissAction::BackdropTap,
        })
        .unwrap();
    assert_eq!(
        effects.into_vec(),
        vec![SheetEffect::ProposeDismiss(DismissAction::BackdropTap)]
    );
}

#[test]
fn test_gestures_ignored_while_dismiss_proposed() {
    let mut sheet = presented(SheetConfig::default());
    drag(&mut sheet, 100.0, 500.0);

    sheet.handle(SheetEvent::DragBegan).unwrap();
    assert_eq!(sheet.state(), SheetState::DismissProposed);

    let effects = sheet
        .handle(SheetEvent::DragChanged {
            translation: -50.0,
            velocity: 0.0,
        })
        .unwrap();
    assert!(effects.is_empty());

    let effects = sheet
        .handle(SheetEvent::Dismiss {
            action: DismissAction::Programmatic,
        })
        .unwrap();
    assert!(effects.is_empty());
}

#[test]
fn test_stray_dismiss_decision_is_ignored() {
    let mut sheet = presented(SheetConfig::default());
    let effects = sheet
        .handle(SheetEvent::DismissDecision { allowed: true })
        .unwrap();
    assert!(effects.is_empty());
    assert_eq!(sheet.state(), SheetState::Idle);
}

#[test]
fn test_dispatch_dismiss_protocol_order() {
    let mut sheet = presented(SheetConfig::default());
    let mut host = RecordingHost {
        allow_dismiss: true,
        ..Default::default()
    };

    sheet.dispatch(SheetEvent::DragBegan, &mut host).unwrap();
    sheet
        .dispatch(
            SheetEvent::DragChanged {
                translation: 120.0,
                velocity: 600.0,
            },
            &mut host,
        )
        .unwrap();
    sheet
        .dispatch(
            SheetEvent::DragEnded {
                translation: 120.0,
                velocity: 600.0,
            },
            &mut host,
        )
        .unwrap();
    assert_eq!(sheet.state(), SheetState::Dismissing);

    pump_frames(&mut sheet, &mut host);

    assert_eq!(host.calls, vec!["propose", "will_dismiss", "did_dismiss"]);
    assert_eq!(host.positions.last(), Some(&800.0));
    assert_eq!(host.positions.len(), host.alphas.len());
}

#[test]
fn test_dispatch_veto() {
    let mut sheet = presented(SheetConfig::default());
    let mut host = RecordingHost::default();

    sheet
        .dispatch(
            SheetEvent::Dismiss {
                action: DismissAction::Programmatic,
            },
            &mut host,
        )
        .unwrap();
    pump_frames(&mut sheet, &mut host);

    assert_eq!(host.calls, vec!["propose", "dismiss_cancelled", "settled 2"]);
    assert_eq!(sheet.state(), SheetState::Idle);
}

// ============================================================================
// External commands
// ============================================================================

#[test]
fn test_transition_to_index() {
    let mut sheet = presented(SheetConfig::default());

    let effects = sheet.handle(SheetEvent::TransitionTo { index: 0 }).unwrap();
    assert!(effects.is_empty());
    assert_eq!(sheet.state(), SheetState::Animating);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(0));
    assert_eq!(sheet.position(), 100.0);
}

#[test]
fn test_transition_out_of_range_is_error() {
    let mut sheet = presented(SheetConfig::default());

    let result = sheet.handle(SheetEvent::TransitionTo { index: 3 });
    assert_eq!(
        result,
        Err(SheetError::TargetIndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(sheet.state(), SheetState::Idle);
    assert_eq!(sheet.current_index(), 2);
}

#[test]
fn test_reset_is_idempotent() {
    let mut sheet = presented(SheetConfig::default());

    sheet.handle(SheetEvent::Reset).unwrap();
    run_frames(&mut sheet);
    let offsets = sheet.offsets().to_vec();
    let position = sheet.position();

    sheet.handle(SheetEvent::Reset).unwrap();
    sheet.handle(SheetEvent::Reset).unwrap();
    run_frames(&mut sheet);

    assert_eq!(sheet.offsets(), offsets.as_slice());
    assert_eq!(sheet.position(), position);
    assert_eq!(sheet.current_index(), 2);
}

#[test]
fn test_resize_recomputes_offsets() {
    let mut sheet = presented(SheetConfig::default());

    sheet
        .handle(SheetEvent::Resize {
            container: ContainerSize::new(390.0, 600.0),
        })
        .unwrap();
    assert_eq!(sheet.offsets(), &[20.0, 200.0, 380.0]);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(2));
    assert_eq!(sheet.position(), 380.0);
}

#[test]
fn test_reload_with_fewer_heights_clamps_index() {
    let mut sheet = presented(SheetConfig::default());

    sheet
        .handle(SheetEvent::Reload {
            heights: vec![SheetHeight::Fixed(300.0)],
        })
        .unwrap();
    assert_eq!(sheet.offsets(), &[500.0]);
    assert_eq!(sheet.current_index(), 0);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(0));
    assert_eq!(sheet.position(), 500.0);
}

#[test]
fn test_reload_empty_heights_uses_automatic() {
    let mut sheet = presented(SheetConfig::default());

    sheet
        .handle(SheetEvent::Reload { heights: vec![] })
        .unwrap();
    assert_eq!(sheet.heights(), &[SheetHeight::Automatic]);
    assert_eq!(sheet.offsets(), &[580.0]);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(0));
}

#[test]
fn test_bad_measurement_is_dropped() {
    init_tracing();
    let mut sheet = SheetController::new(
        vec![SheetHeight::Fixed(300.0), SheetHeight::Automatic],
        |_width: f32| f32::NAN,
        SheetConfig::default(),
    );

    sheet
        .handle(SheetEvent::Present {
            container: container(),
        })
        .unwrap();
    assert_eq!(sheet.offsets(), &[500.0]);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(0));
}

#[test]
fn test_config_from_toml_drives_controller() {
    let config = SheetConfig::from_toml_str(
        r#"
            start_index = 1
            dims_background = false

            [dismiss]
            bottom = false
        "#,
    )
    .unwrap();

    let sheet = presented(config);
    assert_eq!(sheet.position(), 400.0);
    assert!(!sheet.targets()[0].is_dismissal());
}

#[test]
fn test_transition_to_configured_height_settles_on_its_index() {
    let mut sheet = presented(SheetConfig::default());

    let effects = sheet
        .handle(SheetEvent::TransitionToHeight {
            height: SheetHeight::Fixed(400.0),
        })
        .unwrap();
    assert!(effects.is_empty());
    assert_eq!(sheet.state(), SheetState::Animating);

    let effects = run_frames(&mut sheet);
    assert_eq!(settled_index(&effects), Some(1));
    assert_eq!(sheet.current_index(), 1);
    assert_eq!(sheet.position(), 400.0);
}

#[test]
fn test_transition_to_unconfigured_height_keeps_index() {
    let mut sheet = presented(SheetConfig::default());

    // Fixed(500) rests at 300, between the 100 and 400 offsets
    sheet
        .handle(SheetEvent::TransitionToHeight {
            height: SheetHeight::Fixed(500.0),
        })
        .unwrap();
    let effects = run_frames(&mut sheet);

    assert_eq!(settled_index(&effects), None);
    assert_eq!(sheet.state(), SheetState::Idle);
    assert_eq!(sheet.position(), 300.0);
    assert_eq!(sheet.current_index(), 2);
    assert_eq!(sheet.offsets(), &[100.0, 400.0, 580.0]);
}

#[test]
fn test_transition_to_height_errors_and_noops() {
    let mut sheet = create_sheet(SheetConfig::default());
    let effects = sheet
        .handle(SheetEvent::TransitionToHeight {
            height: SheetHeight::Fixed(300.0),
        })
        .unwrap();
    assert!(effects.is_empty());
    assert_eq!(sheet.state(), SheetState::Detached);

    let mut sheet = presented(SheetConfig::default());
    let result = sheet.handle(SheetEvent::TransitionToHeight {
        height: SheetHeight::Fixed(f32::NAN),
    });
    assert!(matches!(result, Err(SheetError::InvalidMeasurement { .. })));
    assert_eq!(sheet.state(), SheetState::Idle);
}

#[test]
fn test_top_edge_dismissal_moves_toward_bottom() {
    let config = SheetConfig::default()
        .with_start_index(0)
        .with_dismiss(DismissEdges {
            bottom: false,
            top: true,
        });
    let mut sheet = presented(config);

    // Top limit bound is 100 - threshold(0, 100) = 75
    let effects = drag(&mut sheet, -60.0, -900.0);
    assert_eq!(
        effects,
        vec![SheetEffect::ProposeDismiss(DismissAction::Drag {
            velocity: -900.0
        })]
    );
    assert_eq!(sheet.position(), 40.0);

    sheet
        .handle(SheetEvent::DismissDecision { allowed: true })
        .unwrap();
    assert_eq!(sheet.state(), SheetState::Dismissing);

    sheet.handle(SheetEvent::Frame { dt: FRAME }).unwrap();
    assert!(sheet.position() > 40.0);
    assert!(sheet.animator().velocity() > 0.0);

    let effects = run_frames(&mut sheet);
    assert_eq!(
        effects.last(),
        Some(&SheetEffect::DidDismiss(DismissAction::Drag {
            velocity: -900.0
        }))
    );
    assert_eq!(sheet.state(), SheetState::Dismissed);
    assert_eq!(sheet.position(), 800.0);
}
