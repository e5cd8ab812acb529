//! # 播放集成测试
//!
//! 测试 Animator → 构建器 → TimelineEngine → SceneView 的播放链路。
//! 这些测试不依赖真实的渲染框架。

use std::cell::{Cell, RefCell};
use std::f64::consts::PI;
use std::rc::Rc;

use motion_host::{AppConfig, Demo, Scenario, Scene, run_scenario};
use motion_runtime::{
    AffineTransform, AnimationError, AnimationKind, Animator, ChainState, EngineOptions,
    PlaybackOptions, Position, Rect, Size, TargetView, TimelineEngine,
};

const EPS: f64 = 1e-9;

struct Stage {
    engine: Rc<TimelineEngine>,
    animator: Animator,
    scene: Rc<Scene>,
}

/// 创建测试用的场景（三个视图，从下到上 back / middle / front）
fn stage() -> Stage {
    stage_with(EngineOptions::default())
}

fn stage_with(options: EngineOptions) -> Stage {
    let engine = Rc::new(TimelineEngine::with_options(options));
    let animator = Animator::new(engine.clone());
    let scene = Scene::new(Size::new(400.0, 300.0));
    scene.add_view("back", Rect::new(0.0, 0.0, 400.0, 300.0));
    scene.add_view("middle", Rect::new(100.0, 100.0, 100.0, 50.0));
    scene.add_view("front", Rect::new(20.0, 20.0, 40.0, 40.0));
    Stage {
        engine,
        animator,
        scene,
    }
}

/// 组合动画的变换按追加顺序连接
#[test]
fn test_composite_transform_composition() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();

    let t1 = AffineTransform::rotation(PI / 3.0);
    let t2 = AffineTransform::translation(4.0, -2.0);
    let t3 = AffineTransform::scale(0.5, 2.0);

    stage
        .animator
        .composite(&view, 0.25)
        .transform(t1)
        .transform(t2)
        .transform(t3)
        .start_animation(|_| {})
        .unwrap();

    let expected = t1.concatenating(&t2).concatenating(&t3);
    assert!(view.transform().approx_eq(&expected, EPS));
    assert_eq!(stage.engine.call_count(), 1);
}

/// 顺序动画：每个单元调用一次引擎，按追加顺序
#[test]
fn test_sequential_engine_calls() {
    let stage = stage();
    let view = stage.scene.view("front").unwrap();
    let durations = [0.1, 0.25, 0.5, 0.125];

    let finished = Rc::new(Cell::new(false));
    let flag = finished.clone();
    stage
        .animator
        .sequential(&view)
        .action_translate(durations[0], 10.0, 0.0)
        .transform_rotation(durations[1], 90.0)
        .action_alpha(durations[2], 0.5)
        .transform_identity(durations[3])
        .start_animation(move |f| flag.set(f))
        .unwrap();

    // 一次只播放一个单元
    assert_eq!(stage.engine.call_count(), 1);
    stage.engine.run_until_idle(100);

    let records = stage.engine.records();
    let requested: Vec<f64> = records.iter().map(|r| r.duration).collect();
    assert_eq!(requested, durations);
    assert_eq!(stage.engine.total_requested_duration(), durations.iter().sum::<f64>());
    assert!(finished.get());
    assert_eq!(view.center().x, 50.0);
    assert_eq!(view.alpha(), 0.5);
}

/// 非循环链：完成回调只调用一次，游标归零
#[test]
fn test_chain_completes_once() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();
    let completions = Rc::new(Cell::new(0));
    let counter = completions.clone();

    let chain = stage
        .animator
        .chained(&view)
        .add(stage.animator.composite(&view, 0.5).action_alpha(0.0))
        .add(stage.animator.sequential(&view).action_alpha(0.5, 1.0))
        .on_complete(move || counter.set(counter.get() + 1));
    chain.start_animation().unwrap();

    stage.engine.run_until_idle(1000);

    assert_eq!(completions.get(), 1);
    assert_eq!(chain.current_index(), 0);
    assert_eq!(chain.state(), ChainState::Completed);
    assert_eq!(stage.engine.call_count(), 2);
}

/// 循环链：M 轮后完成回调调用 M 次
#[test]
fn test_looping_chain_cycles() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();
    let completions = Rc::new(Cell::new(0u32));
    let counter = completions.clone();

    let animator = &stage.animator;
    let grow = animator.composite(&view, 0.25).transform_scale(2.0, 2.0);
    let settle = animator
        .sequential(&view)
        .transform_identity(0.25)
        .action_alpha(0.5, 0.3);
    let show = animator.composite(&view, 0.5).action_alpha(1.0);

    let chain = animator
        .chained(&view)
        .looping(true)
        .add(grow)
        .add(settle)
        .add(show)
        .on_complete(move || counter.set(counter.get() + 1));
    chain.start_animation().unwrap();

    let cycles = 6;
    let segments = 3;
    for _ in 0..cycles {
        stage.engine.advance(1.5);
    }

    assert_eq!(completions.get(), cycles);
    assert_eq!(chain.finished_segments(), u64::from(cycles) * segments);
    assert!(chain.state().is_playing());
    assert!(!stage.engine.is_idle());
}

/// 顺序动画在循环链中每轮完整重放
#[test]
fn test_sequential_replays_in_loop() {
    let stage = stage();
    let view = stage.scene.view("front").unwrap();

    let chain = stage.animator.chained(&view).looping(true).add(
        stage
            .animator
            .sequential(&view)
            .action_translate(0.5, 1.0, 0.0)
            .action_translate(0.5, 0.0, 1.0),
    );
    chain.start_animation().unwrap();

    for _ in 0..3 {
        stage.engine.advance(1.0);
    }

    // 3 轮完成，第 4 轮的第一步已经执行
    assert_eq!(chain.cycles(), 3);
    assert_eq!(view.center().x, 40.0 + 4.0);
    assert_eq!(view.center().y, 40.0 + 3.0);
}

#[test]
fn test_rotation_and_scale_action() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();

    let composite = stage.animator.composite(&view, 0.1).transform_rotation(180.0);
    assert!(composite.transforms()[0].approx_eq(&AffineTransform::rotation(PI), EPS));

    let center = view.center();
    stage
        .animator
        .sequential(&view)
        .action_scale(0.1, 2.0, 1.0)
        .start_animation(|_| {})
        .unwrap();

    assert_eq!(view.frame().width(), 200.0);
    assert_eq!(view.frame().height(), 50.0);
    assert_eq!(view.center(), center);
}

/// 空动画不会调用完成回调
#[test]
fn test_empty_animations() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();
    let called = Rc::new(Cell::new(false));

    let flag = called.clone();
    assert_eq!(
        stage
            .animator
            .sequential(&view)
            .start_animation(move |_| flag.set(true)),
        Err(AnimationError::EmptyAnimationSet {
            kind: AnimationKind::Sequential
        })
    );
    assert_eq!(
        stage.animator.chained(&view).start_animation(),
        Err(AnimationError::EmptyChain)
    );

    let lenient = Animator::new(stage.engine.clone()).with_options(PlaybackOptions::lenient());
    let flag = called.clone();
    lenient
        .sequential(&view)
        .start_animation(move |_| flag.set(true))
        .unwrap();

    stage.engine.run_until_idle(100);
    assert!(!called.get());
    assert_eq!(stage.engine.call_count(), 0);
}

/// 层级动作调整兄弟视图顺序
#[test]
fn test_move_to_reorders_siblings() {
    let stage = stage();
    let back = stage.scene.view("back").unwrap();
    let front = stage.scene.view("front").unwrap();

    stage
        .animator
        .sequential(&back)
        .action_move_to(0.1, Position::Front)
        .start_animation(|_| {})
        .unwrap();
    assert_eq!(stage.scene.z_order(), vec!["middle", "front", "back"]);

    stage
        .animator
        .composite(&front, 0.1)
        .action_move_to(Position::Back)
        .start_animation(|_| {})
        .unwrap();
    assert_eq!(stage.scene.z_order(), vec!["front", "middle", "back"]);
}

/// 视图被移除并释放后，变更变为空操作，播放照常完成
#[test]
fn test_released_view_keeps_playing() {
    let stage = stage();
    let view = stage.scene.view("front").unwrap();
    let animation = stage
        .animator
        .sequential(&view)
        .action_alpha(0.2, 0.0)
        .action_alpha(0.2, 0.5);

    stage.scene.remove_view("front");
    drop(view);

    let finished = Rc::new(Cell::new(false));
    let flag = finished.clone();
    animation.start_animation(move |f| flag.set(f)).unwrap();
    stage.engine.run_until_idle(100);

    assert!(finished.get());
    assert_eq!(stage.engine.call_count(), 2);
}

/// 同步完成的引擎不会让调用栈随步数增长
#[test]
fn test_synchronous_engine_long_sequence() {
    let stage = stage_with(EngineOptions {
        immediate_zero_duration: true,
        ..EngineOptions::default()
    });
    let view = stage.scene.view("front").unwrap();

    let mut animation = stage.animator.sequential(&view);
    for _ in 0..10_000 {
        animation = animation.action_translate(0.0, 0.0, 1.0);
    }

    let order = Rc::new(RefCell::new(Vec::new()));
    let log = order.clone();
    animation
        .start_animation(move |f| log.borrow_mut().push(f))
        .unwrap();

    assert_eq!(*order.borrow(), vec![true]);
    assert_eq!(view.center().y, 40.0 + 10_000.0);
    assert!(stage.engine.is_idle());
}

/// 引擎取消时 finished = false 原样传给顺序动画的完成回调
#[test]
fn test_cancel_forwards_unfinished() {
    let stage = stage();
    let view = stage.scene.view("middle").unwrap();
    let result = Rc::new(Cell::new(None));
    let flag = result.clone();

    stage
        .animator
        .sequential(&view)
        .action_alpha(1.0, 0.0)
        .start_animation(move |f| flag.set(Some(f)))
        .unwrap();
    stage.engine.cancel_all();

    assert_eq!(result.get(), Some(false));
}

/// 所有内置演示都能按配置完成
#[test]
fn test_builtin_scenarios() {
    let config = AppConfig::default();
    for scenario in [Scenario::Pulse, Scenario::Tour, Scenario::Showcase] {
        let report = run_scenario(&config, scenario, Some(2)).unwrap();
        assert_eq!(report.cycles, 2, "{scenario}");
        assert!(report.engine_calls > 0, "{scenario}");
        assert_eq!(report.records.len(), report.engine_calls);
    }
}

/// 综合演示结束后视图回到原位，背景移到最下层
#[test]
fn test_showcase_restores_scene() {
    let config = AppConfig::default();
    let demo = Demo::new(&config);
    let card = demo.scene().view("card").unwrap();
    let before = card.frame();

    let report = demo.run(Scenario::Showcase, 1).unwrap();

    // sequential 3 次 + composite 5 次
    assert_eq!(report.engine_calls, 8);
    assert_eq!(report.in_flight, 0);
    assert!(demo.engine().is_idle());
    assert_eq!(demo.engine().call_count(), 8);
    assert!(card.transform().is_identity());
    assert!((card.frame().width() - before.width()).abs() < EPS);
    assert!((card.center().x - before.center().x).abs() < EPS);
    assert!((card.center().y - before.center().y).abs() < EPS);
    assert_eq!(report.z_order, vec!["backdrop", "card", "badge"]);
}

/// 报告以 JSON 输出
#[test]
fn test_report_serializes_to_json() {
    let config = AppConfig::default();
    let report = run_scenario(&config, Scenario::Tour, Some(1)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["scenario"], "tour");
    assert_eq!(json["cycles"], 1);
    assert_eq!(json["records"].as_array().unwrap().len(), report.engine_calls);
    assert_eq!(json["records"][0]["outcome"], "finished");
    assert!(json["views"][0]["frame"]["origin"]["x"].is_number());
}

/// 配置文件中的策略作用于演示
#[test]
fn test_config_file_drives_demo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "engine": { "time_scale": 2.0 },
            "demo": { "step": 0.05, "cycles": 2 }
        }"#,
    )
    .unwrap();

    let config = AppConfig::load(&path);
    assert!(config.validate().is_ok());

    let report = run_scenario(&config, Scenario::Pulse, None).unwrap();
    assert_eq!(report.cycles, 2);
    // 时间缩放为 2，每轮 0.6 秒的动画需要 1.2 秒虚拟时间
    assert!(report.elapsed >= 2.4 - EPS);
}
