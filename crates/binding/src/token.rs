//! ERC20 surface used by the staking client: USDC, sUSDC and wsUSDC all
//! expose it.

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);

        /// Allow `spender` to pull `amount` from the caller. Required before
        /// deposits into SuperCluster and before wrapping sUSDC.
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
