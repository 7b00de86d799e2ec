//! Constant tables for the sbc filter banks and bit allocator
//!
//! The prototype filters are Proto_4_40 and Proto_8_80 from the A2DP SBC standard.
//! Windows are stored in Q16 and the cosine modulation matrices in Q14, both rounded to
//! nearest from the published values.

use crate::core::Frequency;

/// Proto_4_40 in Q16, analysis window `C[i]`
pub const ANALYSIS_WINDOW_4: [i32; 40] = [
    0, 35, 98, 179, 251, 255, 122, -201,
    715, 1339, 1892, 2110, 1696, 402, -1889, -5089,
    8886, 12779, 16164, 18470, 19288, 18470, 16164, 12779,
    -8886, -5089, -1889, 402, 1696, 2110, 1892, 1339,
    -715, -201, 122, 255, 251, 179, 98, 35,
];

/// Proto_4_40 scaled by -4 in Q16, synthesis window `D[i]`
pub const SYNTHESIS_WINDOW_4: [i32; 40] = [
    0, -141, -391, -717, -1006, -1020, -489, 802,
    -2861, -5358, -7570, -8439, -6783, -1608, 7555, 20355,
    -35545, -51115, -64654, -73880, -77153, -73880, -64654, -51115,
    35545, 20355, 7555, -1608, -6783, -8439, -7570, -5358,
    2861, 802, -489, -1020, -1006, -717, -391, -141,
];

/// `cos((k + 0.5) * (i - 2) * pi / 4)` in Q14
pub const ANALYSIS_MATRIX_4: [[i32; 8]; 4] = [
    [11585, 15137, 16384, 15137, 11585, 6270, 0, -6270],
    [-11585, 6270, 16384, 6270, -11585, -15137, 0, 15137],
    [-11585, -6270, 16384, -6270, -11585, 15137, 0, -15137],
    [11585, -15137, 16384, -15137, 11585, -6270, 0, 6270],
];

/// `cos((i + 0.5) * (k + 2) * pi / 4)` in Q14
pub const SYNTHESIS_MATRIX_4: [[i32; 4]; 8] = [
    [11585, -11585, -11585, 11585],
    [6270, -15137, 15137, -6270],
    [0, 0, 0, 0],
    [-6270, 15137, -15137, 6270],
    [-11585, 11585, 11585, -11585],
    [-15137, -6270, 6270, 15137],
    [-16384, -16384, -16384, -16384],
    [-15137, -6270, 6270, 15137],
];

pub const ANALYSIS_WINDOW_8: [i32; 80] = [
    0, 10, 22, 36, 54, 75, 97, 117,
    132, 138, 131, 106, 59, -12, -108, -229,
    371, 526, 685, 835, 960, 1042, 1063, 1004,
    848, 580, 192, -322, -959, -1711, -2561, -3486,
    4456, 5438, 6395, 7287, 8078, 8734, 9224, 9528,
    9631, 9528, 9224, 8734, 8078, 7287, 6395, 5438,
    -4456, -3486, -2561, -1711, -959, -322, 192, 580,
    848, 1004, 1063, 1042, 960, 835, 685, 526,
    -371, -229, -108, -12, 59, 106, 131, 138,
    132, 117, 97, 75, 54, 36, 22, 10,
];

pub const SYNTHESIS_WINDOW_8: [i32; 80] = [
    0, -82, -180, -291, -432, -598, -774, -935,
    -1055, -1103, -1046, -848, -473, 94, 865, 1834,
    -2967, -4210, -5483, -6683, -7682, -8339, -8504, -8031,
    -6783, -4644, -1533, 2577, 7676, 13689, 20487, 27885,
    -35651, -43508, -51158, -58299, -64626, -69869, -73795, -76226,
    -77047, -76226, -73795, -69869, -64626, -58299, -51158, -43508,
    35651, 27885, 20487, 13689, 7676, 2577, -1533, -4644,
    -6783, -8031, -8504, -8339, -7682, -6683, -5483, -4210,
    2967, 1834, 865, 94, -473, -848, -1046, -1103,
    -1055, -935, -774, -598, -432, -291, -180, -82,
];

pub const ANALYSIS_MATRIX_8: [[i32; 16]; 8] = [
    [11585, 13623, 15137, 16069, 16384, 16069, 15137, 13623, 11585, 9102, 6270, 3196, 0, -3196, -6270, -9102],
    [-11585, -3196, 6270, 13623, 16384, 13623, 6270, -3196, -11585, -16069, -15137, -9102, 0, 9102, 15137, 16069],
    [-11585, -16069, -6270, 9102, 16384, 9102, -6270, -16069, -11585, 3196, 15137, 13623, 0, -13623, -15137, -3196],
    [11585, -9102, -15137, 3196, 16384, 3196, -15137, -9102, 11585, 13623, -6270, -16069, 0, 16069, 6270, -13623],
    [11585, 9102, -15137, -3196, 16384, -3196, -15137, 9102, 11585, -13623, -6270, 16069, 0, -16069, 6270, 13623],
    [-11585, 16069, -6270, -9102, 16384, -9102, -6270, 16069, -11585, -3196, 15137, -13623, 0, 13623, -15137, 3196],
    [-11585, 3196, 6270, -13623, 16384, -13623, 6270, 3196, -11585, 16069, -15137, 9102, 0, -9102, 15137, -16069],
    [11585, -13623, 15137, -16069, 16384, -16069, 15137, -13623, 11585, -9102, 6270, -3196, 0, 3196, -6270, 9102],
];

pub const SYNTHESIS_MATRIX_8: [[i32; 8]; 16] = [
    [11585, -11585, -11585, 11585, 11585, -11585, -11585, 11585],
    [9102, -16069, 3196, 13623, -13623, -3196, 16069, -9102],
    [6270, -15137, 15137, -6270, -6270, 15137, -15137, 6270],
    [3196, -9102, 13623, -16069, 16069, -13623, 9102, -3196],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [-3196, 9102, -13623, 16069, -16069, 13623, -9102, 3196],
    [-6270, 15137, -15137, 6270, 6270, -15137, 15137, -6270],
    [-9102, 16069, -3196, -13623, 13623, 3196, -16069, 9102],
    [-11585, 11585, 11585, -11585, -11585, 11585, 11585, -11585],
    [-13623, 3196, 16069, 9102, -9102, -16069, -3196, 13623],
    [-15137, -6270, 6270, 15137, 15137, 6270, -6270, -15137],
    [-16069, -13623, -9102, -3196, 3196, 9102, 13623, 16069],
    [-16384, -16384, -16384, -16384, -16384, -16384, -16384, -16384],
    [-16069, -13623, -9102, -3196, 3196, 9102, 13623, 16069],
    [-15137, -6270, 6270, 15137, 15137, 6270, -6270, -15137],
    [-13623, 3196, 16069, 9102, -9102, -16069, -3196, 13623],
];

/// Loudness offsets for 4 subbands, indexed by sampling frequency
const LOUDNESS_OFFSET_4: [[i32; 4]; 4] = [
    [-1, 0, 0, 0],
    [-2, 0, 0, 1],
    [-2, 0, 0, 1],
    [-2, 0, 0, 1],
];

/// Loudness offsets for 8 subbands, indexed by sampling frequency
const LOUDNESS_OFFSET_8: [[i32; 8]; 4] = [
    [-2, 0, 0, 0, 0, 0, 0, 1],
    [-3, 0, 0, 0, 0, 0, 1, 2],
    [-4, 0, 0, 0, 0, 0, 1, 2],
    [-4, 0, 0, 0, 0, 0, 1, 2],
];

/// Equal-loudness offsets for a subband count and sampling frequency
pub fn loudness_offsets(subbands: usize, frequency: Frequency) -> &'static [i32] {
    let idx = frequency as usize;
    if subbands == 4 {
        &LOUDNESS_OFFSET_4[idx]
    } else {
        &LOUDNESS_OFFSET_8[idx]
    }
}
