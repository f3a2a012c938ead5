/// RGB triple sent to the wheel ring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses host color specification.
    ///
    /// Accepts `#rrggbb`, `rrggbb`, `#rgb`, `rgb(r, g, b)` and a packed
    /// decimal `0xRRGGBB` value such as `16711680` for red
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        if let Some(args) = spec
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args);
        }

        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex);
        }

        if spec.len() == 6 && spec.chars().all(|c| c.is_ascii_hexdigit()) {
            return parse_hex(spec);
        }

        let packed: u32 = spec.parse().ok()?;
        if packed > 0xFF_FFFF {
            return None;
        }

        Some(Self::from_packed(packed))
    }

    fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Rgb::from_packed),
        3 => {
            // #abc is shorthand for #aabbcc
            let mut channels = hex
                .chars()
                .filter_map(|c| c.to_digit(16))
                .map(|d| (d * 0x11) as u8);

            Some(Rgb::new(channels.next()?, channels.next()?, channels.next()?))
        }
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Rgb> {
    let channels: Vec<u8> = args
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;

    match channels[..] {
        [r, g, b] => Some(Rgb::new(r, g, b)),
        _ => None,
    }
}
