use crate::foundation::core::InputKind;

/// A built-in easing source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Demo {
    /// Identifier used on the command line.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Kind of `source`.
    pub kind: InputKind,
    /// Script text or SVG path data.
    pub source: &'static str,
}

const BOUNCE: &str = r#"// Write/paste an 'easing' function:
fn easing(pos) {
    let n1 = 7.5625;
    let d1 = 2.75;

    if pos < 1.0 / d1 {
        n1 * pos * pos
    } else if pos < 2.0 / d1 {
        let p = pos - 1.5 / d1;
        n1 * p * p + 0.75
    } else if pos < 2.5 / d1 {
        let p = pos - 2.25 / d1;
        n1 * p * p + 0.9375
    } else {
        let p = pos - 2.625 / d1;
        n1 * p * p + 0.984375
    }
}
"#;

const ELASTIC: &str = r#"fn easing(x) {
    if x == 0.0 || x == 1.0 {
        return x;
    }
    let c4 = (2.0 * PI()) / 3.0;
    2.0 ** (-10.0 * x) * sin((x * 10.0 - 0.75) * c4) + 1.0
}
"#;

const MATERIAL_EMPHASIZED: &str = "M 0,0
C 0.05, 0, 0.133333, 0.06, 0.166666, 0.4
C 0.208333, 0.82, 0.25, 1, 1, 1";

/// All built-in demos.
pub const DEMOS: &[Demo] = &[
    Demo {
        id: "bounce",
        title: "Bounce",
        kind: InputKind::Script,
        source: BOUNCE,
    },
    Demo {
        id: "elastic",
        title: "Elastic",
        kind: InputKind::Script,
        source: ELASTIC,
    },
    Demo {
        id: "material-emphasized",
        title: "Material Design emphasized easing",
        kind: InputKind::SvgPath,
        source: MATERIAL_EMPHASIZED,
    },
];

/// Look up a demo by id.
pub fn find_demo(id: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.id == id)
}
