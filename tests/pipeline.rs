use std::io::Cursor;

use colors_transform::Color;
use emote_fx::{
    codec::{decode_animation, encode_animation},
    color::to_hsl,
    utils::{get_delay, get_delay_centisecs},
    Config, EmoteError, Gifsicle, InProcess, Param, Pipeline, RawCommand, Request, Source,
};
use image::{Frame, ImageOutputFormat, Rgba, RgbaImage};

fn pipeline() -> Pipeline<InProcess> {
    Pipeline::new(InProcess::default(), Config::new().with_seed(1234))
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
        .unwrap();
    data
}

fn gif(frames: usize, delay: u32, color: [u8; 4]) -> Vec<u8> {
    let frames = (0..frames)
        .map(|_| Frame::from_parts(RgbaImage::from_pixel(16, 16, Rgba(color)), 0, 0, get_delay(delay)))
        .collect();
    encode_animation(frames, 10).unwrap()
}

fn command(name: &str, param: Option<&str>) -> RawCommand {
    RawCommand::new(name, param.map(|param| Param::Text(param.to_owned())))
}

fn delays(data: &[u8]) -> Vec<u32> {
    decode_animation(data)
        .unwrap()
        .frames
        .iter()
        .map(|frame| get_delay_centisecs(frame.delay()))
        .collect()
}

#[tokio::test]
async fn spinning_a_still_image() {
    let request = Request::new(
        Source::Bytes(png(20, 12, [255, 255, 255, 255])),
        vec![command("spin", Some("fast"))],
    );

    let output = pipeline().process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();

    // 360 / (360 * 6 / 150) frames on a square canvas
    assert_eq!(animation.frames.len(), 25);
    assert_eq!((animation.width, animation.height), (20, 20));
    assert!(delays(&output).iter().all(|&delay| delay == 6));

    let first = animation.frames[0].buffer();
    assert_eq!(first.get_pixel(10, 0).0[3], 0);
    assert_eq!(first.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn rainbow_on_a_short_gif() {
    let request = Request::new(
        Source::Bytes(gif(4, 8, [200, 40, 40, 255])),
        vec![command("rainbow", None)],
    );

    let output = pipeline().process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();

    assert_eq!(animation.frames.len() % 32, 0);

    let hues: Vec<f32> = animation
        .frames
        .iter()
        .map(|frame| {
            let [r, g, b, _] = frame.buffer().get_pixel(8, 8).0;
            to_hsl([r, g, b]).get_hue() / 360.0
        })
        .collect();
    for pair in hues.windows(2) {
        let advance = (pair[1] - pair[0]).rem_euclid(1.0);
        assert!(advance > 0.0 && advance < 0.1, "{hues:?}");
    }
}

#[tokio::test]
async fn hyperspeed_halves_long_gifs() {
    let request = Request::new(
        Source::Bytes(gif(8, 10, [10, 10, 200, 255])),
        vec![command("hyperspeed", None)],
    );

    let output = pipeline().process(request).await.unwrap();
    assert_eq!(delays(&output), vec![2; 4]);
}

#[tokio::test]
async fn hyperspeed_keeps_short_gifs() {
    let request = Request::new(
        Source::Bytes(gif(3, 10, [10, 10, 200, 255])),
        vec![command("hyperspeed", None)],
    );

    let output = pipeline().process(request).await.unwrap();
    assert_eq!(delays(&output), vec![2; 3]);
}

#[tokio::test]
async fn effects_run_in_sequence() {
    let request = Request::new(
        Source::Bytes(png(20, 20, [30, 160, 90, 255])),
        vec![command("rainbow", None), command("spin", None)],
    );

    let output = pipeline().process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();

    // 32 rainbow frames aligned to a 25 frame turn
    assert_eq!(animation.frames.len() % 25, 0);
    assert!(animation.frames.len() >= 100);
    assert!(delays(&output).iter().all(|&delay| delay == 8));
}

#[tokio::test]
async fn still_resize_applies_before_effects() {
    let request = Request::new(
        Source::Bytes(png(20, 20, [30, 160, 90, 255])),
        vec![command("resize", Some("0.5")), command("shake", Some("hyper"))],
    );

    let output = pipeline().process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();

    assert_eq!((animation.width, animation.height), (10, 10));
    assert_eq!(delays(&output), vec![2; 4]);
}

#[tokio::test]
async fn structural_commands_on_a_still() {
    let request = Request::new(
        Source::Bytes(png(8, 4, [1, 2, 3, 255])),
        vec![
            command("rotate", Some("90")),
            command("resize", Some("2")),
            command("moonwalk", None),
        ],
    );

    let output = pipeline().process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();

    assert_eq!((animation.width, animation.height), (8, 16));
}

#[tokio::test]
async fn same_seed_same_output() {
    let request = || {
        Request::new(
            Source::Bytes(png(16, 16, [0, 0, 0, 255])),
            vec![command("rain", Some("glitter"))],
        )
    };

    let first = pipeline().process(request()).await.unwrap();
    let second = pipeline().process(request()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn decode_errors_abort_the_request() {
    let request = Request::new(
        Source::Bytes(b"definitely not an image".to_vec()),
        vec![command("spin", None)],
    );

    assert!(matches!(
        pipeline().process(request).await,
        Err(EmoteError::Decode(_))
    ));
}

#[tokio::test]
async fn invalid_params_abort_before_loading() {
    let request = Request::new(
        Source::Path("does/not/exist.png".into()),
        vec![command("rotate", Some("45"))],
    );

    assert!(matches!(
        pipeline().process(request).await,
        Err(EmoteError::InvalidParam { .. })
    ));
}

#[cfg(not(feature = "remote"))]
#[tokio::test]
async fn urls_need_the_remote_feature() {
    let request = Request::new(Source::Url("https://cdn.example.com/emote.gif".into()), vec![]);

    assert!(matches!(
        pipeline().process(request).await,
        Err(EmoteError::UnsupportedSource(_))
    ));
}

#[tokio::test]
async fn json_request_from_file() {
    let dir = std::env::temp_dir().join(format!("emote-fx-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("source.png");
    std::fs::write(&path, png(6, 6, [250, 10, 10, 255])).unwrap();

    let body = format!(
        r#"{{"url": "{}", "options": [["slide", "hyper"], ["flip"]]}}"#,
        path.display()
    );
    let request: Request = serde_json::from_str(&body).unwrap();

    let output = pipeline().process(request).await.unwrap();
    assert_eq!(delays(&output), vec![4; 4]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn gifsicle_pipeline() {
    let available = std::process::Command::new("gifsicle")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success());
    if !available {
        eprintln!("gifsicle not found, skipping");
        return;
    }

    let pipeline = Pipeline::new(Gifsicle::default(), Config::new().with_seed(7));
    let request = Request::new(
        Source::Bytes(gif(6, 8, [120, 200, 40, 255])),
        vec![
            command("resize", Some("0.5")),
            command("shake", None),
            command("hyperspeed", None),
        ],
    );

    let output = pipeline.process(request).await.unwrap();
    let animation = decode_animation(&output).unwrap();
    assert_eq!((animation.width, animation.height), (8, 8));
    assert!(delays(&output).iter().all(|&delay| delay == 2));
}
