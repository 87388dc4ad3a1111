/// mask with bits `0..=index` set.
#[inline]
pub const fn bit_range_lower(index: u32) -> u32 {
    let large: u32 = if index != 31 { 1 << (index + 1) } else { 0 };
    large.wrapping_sub(1)
}

#[inline]
pub const fn mask_lower(bin: u32, index: u32) -> u32 {
    bin & bit_range_lower(index)
}

/// `true` if any bit above `index` is set.
#[inline]
pub const fn exceeds(bin: u32, index: u32) -> bool {
    bin & !bit_range_lower(index) != 0
}
